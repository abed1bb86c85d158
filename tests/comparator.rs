mod common;

use std::sync::Arc;
use cloudmare::config::EngineConfig;
use cloudmare::decision::{AutoPolicy, DecisionPolicy, FixedPolicy};
use cloudmare::detection::ProtectionClassifier;
use cloudmare::models::{Candidate, Provider, ScanStatus};
use cloudmare::net::IntelAnswer;
use cloudmare::origin::OriginComparator;
use common::*;

fn comparator(
    http: &Arc<FakeHttp>,
    resolver: &Arc<FakeResolver>,
    intel: Arc<FakeIntel>,
    policy: Arc<dyn DecisionPolicy>,
) -> OriginComparator {
    comparator_with(&engine(), http, resolver, intel, policy)
}

fn comparator_with(
    config: &EngineConfig,
    http: &Arc<FakeHttp>,
    resolver: &Arc<FakeResolver>,
    intel: Arc<FakeIntel>,
    policy: Arc<dyn DecisionPolicy>,
) -> OriginComparator {
    let classifier = Arc::new(ProtectionClassifier::new(http.clone(), intel, FakePorts::open(&[80])));
    OriginComparator::new(config, http.clone(), resolver.clone(), classifier, policy)
}

fn origin_resolver() -> Arc<FakeResolver> {
    FakeResolver::with(&[("origin.example.com", ORIGIN_IP)])
}

#[tokio::test]
async fn identical_bodies_are_exposed() {
    let http = FakeHttp::new();
    http.page("http://example.com", "HELLO");
    http.page("http://203.0.113.10", "HELLO");
    let resolver = origin_resolver();

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Exposed);
    assert_eq!(result.real_ip.as_deref(), Some(ORIGIN_IP));
    assert_eq!(result.similarity_score, Some(1.0));

    let direct = http.direct_calls();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].host_header.as_deref(), Some("example.com"));
    assert!(!direct[0].follow_redirects);
}

#[tokio::test]
async fn identical_bodies_are_exposed_at_full_threshold() {
    let http = FakeHttp::new();
    http.page("http://example.com", "HELLO");
    http.page("http://203.0.113.10", "HELLO");
    let resolver = origin_resolver();
    let mut config = engine();
    config.similarity_threshold = 1.0;

    let result = comparator_with(&config, &http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Exposed);
    assert_eq!(result.similarity_score, Some(1.0));
}

#[tokio::test]
async fn near_match_is_rejected_at_full_threshold() {
    let http = FakeHttp::new();
    http.page("http://example.com", "<html><body>Welcome to the shop, id=1234</body></html>");
    http.page("http://203.0.113.10", "<html><body>Welcome to the shop, id=9876</body></html>");
    let resolver = origin_resolver();
    let mut config = engine();
    config.similarity_threshold = 1.0;

    let result = comparator_with(&config, &http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Error);
    assert!(result.similarity_score.unwrap() < 1.0);
}

#[tokio::test]
async fn disjoint_bodies_are_not_exposed() {
    let http = FakeHttp::new();
    http.page("http://example.com", &"a".repeat(400));
    http.page("http://203.0.113.10", &"z".repeat(400));
    let resolver = origin_resolver();

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Error);
    assert!(result.real_ip.is_none());
    let score = result.similarity_score.unwrap();
    assert!(score < 0.9);
    assert!(result.cause.unwrap().contains("is not the IP"));
}

#[tokio::test]
async fn redirect_is_followed_once_under_auto_force() {
    let http = FakeHttp::new();
    http.page("http://example.com", "WELCOME HOME");
    http.respond(
        "http://203.0.113.10",
        with_header(response("http://203.0.113.10", 302, "moved"), "Location", "http://203.0.113.10/home"),
    );
    http.respond_followed("http://203.0.113.10", response("http://203.0.113.10/home", 200, "WELCOME HOME"));
    let resolver = origin_resolver();

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Exposed);
    assert_eq!(result.similarity_score, Some(1.0));

    let direct = http.direct_calls();
    assert_eq!(direct.len(), 2);
    assert!(!direct[0].follow_redirects);
    assert_eq!(direct.iter().filter(|c| c.follow_redirects).count(), 1);
}

#[tokio::test]
async fn declined_redirect_and_force_is_an_error_without_score() {
    let http = FakeHttp::new();
    http.page("http://example.com", "WELCOME HOME");
    http.respond(
        "http://203.0.113.10",
        with_header(response("http://203.0.113.10", 302, "moved"), "Location", "/home"),
    );
    let resolver = origin_resolver();
    let policy = Arc::new(FixedPolicy { follow_redirects: false, force_connection: false });

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), policy)
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Error);
    assert!(result.similarity_score.is_none());
    assert!(result.cause.unwrap().contains("302"));
    assert_eq!(http.direct_calls().len(), 1);
}

#[tokio::test]
async fn forced_non_200_scores_the_final_response() {
    let http = FakeHttp::new();
    http.page("http://example.com", "HELLO");
    http.respond("http://203.0.113.10", response("http://203.0.113.10", 403, "HELLO"));
    let resolver = origin_resolver();

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Exposed);
}

#[tokio::test]
async fn ip_literal_skips_dns() {
    let http = FakeHttp::new();
    http.page("http://example.com", "HELLO");
    http.page("http://203.0.113.10", "HELLO");
    let resolver = FakeResolver::with(&[]);

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new(ORIGIN_IP))
        .await;

    assert_eq!(result.status, ScanStatus::Exposed);
    assert_eq!(resolver.call_count(), 0);
}

#[tokio::test]
async fn baseline_redirect_sets_host_header() {
    let http = FakeHttp::new();
    http.respond("http://example.com", response("https://www.example.com/home", 200, "HELLO"));
    http.page("http://203.0.113.10", "HELLO");
    let resolver = origin_resolver();

    comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    let direct = http.direct_calls();
    assert_eq!(direct[0].host_header.as_deref(), Some("www.example.com"));
}

#[tokio::test]
async fn protected_ip_stops_before_fetching() {
    let http = FakeHttp::new();
    http.page("http://example.com", "HELLO");
    http.page("http://203.0.113.10", "HELLO");
    let resolver = origin_resolver();
    let intel = FakeIntel::with(&[(ORIGIN_IP, IntelAnswer::Organization("cloudflare, inc.".into()))]);

    let result = comparator(&http, &resolver, intel, Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("origin.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Protected);
    assert_eq!(result.provider, Some(Provider::Cloudflare));
    assert_eq!(result.waf_ip.as_deref(), Some(ORIGIN_IP));
    assert_eq!(http.calls_to("http://example.com"), 0);
}

#[tokio::test]
async fn unresolvable_candidate_is_an_error() {
    let http = FakeHttp::new();
    let resolver = FakeResolver::with(&[]);

    let result = comparator(&http, &resolver, FakeIntel::unlisted(), Arc::new(AutoPolicy))
        .compare(DOMAIN, &Candidate::new("gone.example.com"))
        .await;

    assert_eq!(result.status, ScanStatus::Error);
    assert!(result.cause.unwrap().contains("gone.example.com"));
    assert!(http.calls().is_empty());
}

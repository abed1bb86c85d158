use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::config::EngineConfig;
use crate::decision::{DecisionPolicy, ForcePrompt, RedirectPrompt};
use crate::detection::ProtectionClassifier;
use crate::errors::CloudmareError;
use crate::models::{Candidate, ComparisonResult, ProtectionVerdict};
use crate::net::{FetchOptions, HttpProbe, HttpResponse, Resolver};
use crate::utils::formatting::format_percent;
use crate::utils::similarity::{is_match, similarity_score};
use crate::utils::truncation::truncate_cause;
use super::pacing::RequestPacer;

/// Judges whether a candidate serves the same site as the public domain when
/// contacted directly.
pub struct OriginComparator {
    http: Arc<dyn HttpProbe>,
    resolver: Arc<dyn Resolver>,
    classifier: Arc<ProtectionClassifier>,
    policy: Arc<dyn DecisionPolicy>,
    pacer: RequestPacer,
    timeout: Duration,
    threshold: f64,
}

impl OriginComparator {
    pub fn new(
        config: &EngineConfig,
        http: Arc<dyn HttpProbe>,
        resolver: Arc<dyn Resolver>,
        classifier: Arc<ProtectionClassifier>,
        policy: Arc<dyn DecisionPolicy>,
    ) -> Self {
        Self {
            http,
            resolver,
            classifier,
            policy,
            pacer: RequestPacer::new(config.delay),
            timeout: config.http_timeout,
            threshold: config.similarity_threshold,
        }
    }

    /// Never fails outward: every error becomes an `Error` result with a
    /// readable cause.
    pub async fn compare(&self, domain: &str, candidate: &Candidate) -> ComparisonResult {
        match self.try_compare(domain, candidate).await {
            Ok(result) => result,
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "Comparison failed");
                ComparisonResult::error(candidate.clone(), truncate_cause(&e.to_string()), None)
            }
        }
    }

    async fn try_compare(&self, domain: &str, candidate: &Candidate) -> Result<ComparisonResult, CloudmareError> {
        let ip = match candidate.ip_literal() {
            Some(ip) => ip,
            None => self.resolver.resolve(candidate.as_str()).await?,
        };
        let ip_text = ip.to_string();

        if let ProtectionVerdict::Protected { provider, .. } = self.classifier.classify(&ip_text).await {
            info!(candidate = %candidate, ip = %ip_text, provider = %provider, "Candidate IP is behind a protection provider");
            return Ok(ComparisonResult::protected(candidate.clone(), ip_text, provider));
        }

        self.pacer.pause().await;
        let baseline = self
            .http
            .get(&format!("http://{}", domain), &FetchOptions::new(self.timeout))
            .await?;
        let host_header = baseline.effective_host().unwrap_or_else(|| domain.to_string());
        info!(ip = %ip_text, host = %host_header, "Connecting using Host header");

        let direct_url = direct_url(ip);
        let opts = FetchOptions::new(self.timeout).with_host(host_header.clone()).no_redirects();
        self.pacer.pause().await;
        let mut response = self.http.get(&direct_url, &opts).await?;

        if response.is_redirect() {
            let prompt = RedirectPrompt {
                url: direct_url.clone(),
                location: response.location().map(str::to_string),
            };
            info!(url = %direct_url, location = ?prompt.location, "Candidate redirects");
            if self.policy.should_follow_redirect(&prompt).await {
                let follow = FetchOptions::new(self.timeout).with_host(host_header);
                self.pacer.pause().await;
                response = self.http.get(&direct_url, &follow).await?;
            }
        }

        if response.status != 200 {
            let prompt = ForcePrompt { url: response.final_url.clone(), status: response.status };
            warn!(url = %prompt.url, status = prompt.status, "Unexpected status code");
            if !self.policy.should_force_connection(&prompt).await {
                return Err(CloudmareError::UserDeclinedForce(
                    CloudmareError::UnexpectedStatus { status: prompt.status, url: prompt.url }.to_string(),
                ));
            }
        }

        self.judge(candidate, &ip_text, domain, baseline, response).await
    }

    /// The body of the final candidate response, forced or not, is what gets
    /// scored against the baseline.
    async fn judge(
        &self,
        candidate: &Candidate,
        ip: &str,
        domain: &str,
        baseline: HttpResponse,
        response: HttpResponse,
    ) -> Result<ComparisonResult, CloudmareError> {
        let score = similarity_score(baseline.body, response.body).await?;
        debug!(candidate = %candidate, ip = %ip, score, threshold = self.threshold, "Similarity computed");

        if is_match(score, self.threshold) {
            info!(ip = %ip, score, "Connection matches {}; real IP found", domain);
            Ok(ComparisonResult::exposed(candidate.clone(), ip, score))
        } else {
            Ok(ComparisonResult::error(
                candidate.clone(),
                format!("{} is not the IP ({} similarity to {})", ip, format_percent(score), domain),
                Some(score),
            ))
        }
    }
}

fn direct_url(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => format!("http://{}", v4),
        IpAddr::V6(v6) => format!("http://[{}]", v6),
    }
}

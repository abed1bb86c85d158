#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use cloudmare::config::EngineConfig;
use cloudmare::decision::DecisionPolicy;
use cloudmare::errors::CloudmareError;
use cloudmare::net::{FetchOptions, HttpProbe, HttpResponse, IntelAnswer, IntelLookup, PortProbe, RecordKind, Resolver};
use cloudmare::pipeline::ScanServices;

pub const DOMAIN: &str = "example.com";
pub const ORIGIN_IP: &str = "203.0.113.10";

pub fn response(url: &str, status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        final_url: url.to_string(),
        headers: HashMap::new(),
        body: body.to_string(),
    }
}

pub fn with_header(mut response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    response.headers.insert(name.to_lowercase(), value.to_string());
    response
}

/// A request the fake saw.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub host_header: Option<String>,
    pub follow_redirects: bool,
}

#[derive(Default)]
struct Route {
    direct: Option<HttpResponse>,
    followed: Option<HttpResponse>,
}

/// Scripted HTTP probe keyed by URL. Unknown URLs refuse the connection.
#[derive(Default)]
pub struct FakeHttp {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Same response whether or not redirects are followed.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        let mut routes = self.routes.lock().unwrap();
        let route = routes.entry(url.to_string()).or_default();
        route.direct = Some(response.clone());
        route.followed = Some(response);
    }

    /// Response when the caller follows redirects.
    pub fn respond_followed(&self, url: &str, response: HttpResponse) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_string()).or_default().followed = Some(response);
    }

    pub fn page(&self, url: &str, body: &str) {
        self.respond(url, response(url, 200, body));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.url == url).count()
    }

    /// Requests that carried a Host override, i.e. comparator direct fetches.
    pub fn direct_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.host_header.is_some()).collect()
    }
}

#[async_trait]
impl HttpProbe for FakeHttp {
    async fn get(&self, url: &str, opts: &FetchOptions) -> Result<HttpResponse, CloudmareError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            host_header: opts.host_header.clone(),
            follow_redirects: opts.follow_redirects,
        });
        let routes = self.routes.lock().unwrap();
        let route = routes.get(url);
        let reply = if opts.follow_redirects {
            route.and_then(|r| r.followed.clone())
        } else {
            route.and_then(|r| r.direct.clone())
        };
        reply.ok_or_else(|| CloudmareError::ConnectionRefused(url.to_string()))
    }
}

#[derive(Default)]
pub struct FakeResolver {
    hosts: HashMap<String, IpAddr>,
    pub calls: AtomicUsize,
}

impl FakeResolver {
    pub fn with(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            hosts: entries
                .iter()
                .map(|(h, ip)| (h.to_string(), ip.parse().unwrap()))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for FakeResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, CloudmareError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| CloudmareError::DnsResolution(host.to_string()))
    }

    async fn records(&self, _domain: &str, _kind: RecordKind) -> Result<Vec<String>, CloudmareError> {
        Ok(Vec::new())
    }
}

/// Answers by host; hosts without an entry get `Unlisted`.
#[derive(Default)]
pub struct FakeIntel {
    answers: HashMap<String, IntelAnswer>,
}

impl FakeIntel {
    pub fn unlisted() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(entries: &[(&str, IntelAnswer)]) -> Arc<Self> {
        Arc::new(Self {
            answers: entries.iter().map(|(h, a)| (h.to_string(), a.clone())).collect(),
        })
    }
}

#[async_trait]
impl IntelLookup for FakeIntel {
    async fn lookup(&self, host: &str) -> Result<IntelAnswer, CloudmareError> {
        Ok(self.answers.get(host).cloned().unwrap_or(IntelAnswer::Unlisted))
    }
}

pub struct FakePorts {
    open: Vec<u16>,
    pub calls: AtomicUsize,
}

impl FakePorts {
    pub fn open(ports: &[u16]) -> Arc<Self> {
        Arc::new(Self { open: ports.to_vec(), calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl PortProbe for FakePorts {
    async fn is_open(&self, _host: &str, port: u16, _timeout: Duration) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.open.contains(&port)
    }
}

pub fn services(
    http: Arc<FakeHttp>,
    resolver: Arc<FakeResolver>,
    intel: Arc<FakeIntel>,
    policy: Arc<dyn DecisionPolicy>,
) -> ScanServices {
    ScanServices {
        http,
        intel,
        ports: FakePorts::open(&[80]),
        resolver,
        policy,
    }
}

pub fn engine() -> EngineConfig {
    EngineConfig::default()
}

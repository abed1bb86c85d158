use std::net::IpAddr;
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use tracing::{debug, warn};
use crate::errors::CloudmareError;

/// DNS record kinds harvested as extra candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Mx,
    Ns,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mx => "MX",
            Self::Ns => "NS",
        }
    }
}

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a hostname to its first address. Unknown names map to
    /// `CloudmareError::DnsResolution`.
    async fn resolve(&self, host: &str) -> Result<IpAddr, CloudmareError>;

    /// Target hostnames of the given record type.
    async fn records(&self, domain: &str, kind: RecordKind) -> Result<Vec<String>, CloudmareError>;
}

pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    /// Use the system resolver configuration, falling back to public
    /// defaults when it cannot be read.
    pub fn from_system() -> Self {
        let inner = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!(error = %e, "System DNS configuration unavailable, using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { inner }
    }
}

fn map_resolve_error(host: &str, err: hickory_resolver::error::ResolveError) -> CloudmareError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => CloudmareError::DnsResolution(host.to_string()),
        ResolveErrorKind::Timeout => CloudmareError::NetworkTimeout(format!("DNS lookup for {}", host)),
        _ => CloudmareError::DnsResolution(format!("{} ({})", host, err)),
    }
}

#[async_trait]
impl Resolver for HickoryResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, CloudmareError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        let lookup = self.inner.lookup_ip(host).await.map_err(|e| map_resolve_error(host, e))?;
        let ip = lookup
            .iter()
            .next()
            .ok_or_else(|| CloudmareError::DnsResolution(host.to_string()))?;
        debug!(host = %host, ip = %ip, "Resolved host");
        Ok(ip)
    }

    async fn records(&self, domain: &str, kind: RecordKind) -> Result<Vec<String>, CloudmareError> {
        let names: Vec<String> = match kind {
            RecordKind::Mx => self
                .inner
                .mx_lookup(domain)
                .await
                .map_err(|e| map_resolve_error(domain, e))?
                .iter()
                .map(|mx| mx.exchange().to_string())
                .collect(),
            RecordKind::Ns => self
                .inner
                .ns_lookup(domain)
                .await
                .map_err(|e| map_resolve_error(domain, e))?
                .iter()
                .map(|ns| ns.0.to_string())
                .collect(),
        };
        Ok(names
            .into_iter()
            .map(|n| n.trim_end_matches('.').to_lowercase())
            .filter(|n| !n.is_empty())
            .collect())
    }
}

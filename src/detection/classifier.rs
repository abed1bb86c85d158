use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use crate::models::ProtectionVerdict;
use crate::net::{FetchOptions, HttpProbe, IntelAnswer, IntelLookup, PortProbe, PORT_PROBE_TIMEOUT};
use super::signatures::{match_organization, match_server_header};

pub const HEADER_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const PROBE_PORTS: [u16; 2] = [80, 443];

/// Decides whether a host sits behind a known protection provider.
///
/// Tiers, stopping at the first conclusive signal:
/// 1. `Server` header of a plain HTTP GET.
/// 2. Organisation text from the IP-intelligence service.
/// 3. TCP reachability of ports 80/443.
///
/// Every failure is absorbed; an inconclusive host is `NotProtected` so the
/// scan always proceeds.
pub struct ProtectionClassifier {
    http: Arc<dyn HttpProbe>,
    intel: Arc<dyn IntelLookup>,
    ports: Arc<dyn PortProbe>,
    header_timeout: Duration,
    port_timeout: Duration,
}

impl ProtectionClassifier {
    pub fn new(http: Arc<dyn HttpProbe>, intel: Arc<dyn IntelLookup>, ports: Arc<dyn PortProbe>) -> Self {
        Self {
            http,
            intel,
            ports,
            header_timeout: HEADER_PROBE_TIMEOUT,
            port_timeout: PORT_PROBE_TIMEOUT,
        }
    }

    pub async fn classify(&self, host: &str) -> ProtectionVerdict {
        if let Some(verdict) = self.header_tier(host).await {
            return verdict;
        }
        if let Some(verdict) = self.intel_tier(host).await {
            return verdict;
        }
        self.port_tier(host).await
    }

    async fn header_tier(&self, host: &str) -> Option<ProtectionVerdict> {
        let url = format!("http://{}", host);
        let opts = FetchOptions::new(self.header_timeout);
        match self.http.get(&url, &opts).await {
            Ok(response) => {
                let server = response.header("server").unwrap_or_default().to_lowercase();
                let provider = match_server_header(&server)?;
                info!(host = %host, provider = %provider, server = %server, "Protection detected from Server header");
                Some(ProtectionVerdict::Protected { provider, evidence_ip: host.to_string() })
            }
            Err(e) => {
                debug!(host = %host, error = %e, "Header probe failed, falling back to IP intelligence");
                None
            }
        }
    }

    async fn intel_tier(&self, host: &str) -> Option<ProtectionVerdict> {
        match self.intel.lookup(host).await {
            Ok(IntelAnswer::NoData) => {
                debug!(host = %host, "IP intelligence has no data, treating as not protected");
                Some(ProtectionVerdict::NotProtected)
            }
            Ok(IntelAnswer::Organization(org)) => {
                let provider = match_organization(&org)?;
                info!(host = %host, provider = %provider, organization = %org, "Protection detected from IP intelligence");
                Some(ProtectionVerdict::Protected { provider, evidence_ip: host.to_string() })
            }
            Ok(IntelAnswer::Unlisted) => None,
            Err(e) => {
                debug!(host = %host, error = %e, "IP intelligence lookup failed, falling back to port probe");
                None
            }
        }
    }

    async fn port_tier(&self, host: &str) -> ProtectionVerdict {
        for port in PROBE_PORTS {
            if self.ports.is_open(host, port, self.port_timeout).await {
                debug!(host = %host, port, "Host answers directly");
                return ProtectionVerdict::NotProtected;
            }
        }
        debug!(host = %host, "No signal from any tier, defaulting to not protected");
        ProtectionVerdict::NotProtected
    }
}

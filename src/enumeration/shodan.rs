use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use crate::config::credentials::redact_key;
use crate::errors::{with_retry, CloudmareError, RetryConfig};
use crate::models::Candidate;
use super::source::CandidateSource;

pub const SHODAN_API_URL: &str = "https://api.shodan.io";
const SHODAN_TIMEOUT: Duration = Duration::from_secs(15);
const SHODAN_FACET_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    facets: Facets,
}

#[derive(Debug, Default, Deserialize)]
struct Facets {
    #[serde(default)]
    ip: Vec<FacetValue>,
}

#[derive(Debug, Deserialize)]
struct FacetValue {
    value: Value,
}

/// Addresses Shodan has observed serving the domain, via the host count
/// facet query.
pub struct ShodanSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl ShodanSearch {
    pub fn new(api_key: impl Into<String>, retry: RetryConfig) -> Result<Self, CloudmareError> {
        Self::with_base_url(SHODAN_API_URL, api_key, retry)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryConfig,
    ) -> Result<Self, CloudmareError> {
        let client = reqwest::Client::builder()
            .timeout(SHODAN_TIMEOUT)
            .build()
            .map_err(|e| CloudmareError::Internal(format!("Failed to build Shodan client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry,
        })
    }

    async fn query(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let url = format!("{}/shodan/host/count", self.base_url);
        let facets = format!("ip:{}", SHODAN_FACET_LIMIT);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("query", domain), ("facets", facets.as_str())])
            .send()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("Shodan: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CloudmareError::Config(format!(
                "Shodan rejected API key {}",
                redact_key(&self.api_key)
            )));
        }
        if !status.is_success() {
            return Err(CloudmareError::ExternalServiceUnavailable(format!(
                "Shodan returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("Shodan response: {}", e)))?;
        Ok(body.facets.ip.iter().filter_map(|f| facet_ip(&f.value)).map(Candidate::new).collect())
    }
}

/// Facet values arrive either as dotted strings or as packed IPv4 integers.
fn facet_ip(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => s.parse::<IpAddr>().ok().map(|ip| ip.to_string()),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| Ipv4Addr::from(n).to_string()),
        _ => None,
    }
}

#[async_trait]
impl CandidateSource for ShodanSearch {
    fn name(&self) -> &str {
        "shodan"
    }

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        debug!(key = %redact_key(&self.api_key), domain = %domain, "Querying Shodan");
        let found = with_retry("shodan_host_count", &self.retry, || self.query(domain)).await?;
        info!(domain = %domain, count = found.len(), "Shodan candidates collected");
        Ok(found)
    }
}

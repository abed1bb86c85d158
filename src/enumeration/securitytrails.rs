use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use crate::config::credentials::redact_key;
use crate::errors::{with_retry, CloudmareError, RetryConfig};
use crate::models::Candidate;
use super::source::CandidateSource;

pub const SECURITYTRAILS_API_URL: &str = "https://api.securitytrails.com/v1";
const SECURITYTRAILS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    records: Vec<HistoryRecord>,
}

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    values: Vec<RecordValue>,
}

#[derive(Debug, Deserialize)]
struct RecordValue {
    ip: Option<String>,
}

/// Addresses from the domain's historical A records. Origins often show
/// up here from before the site moved behind a proxy.
pub struct SecurityTrailsSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl SecurityTrailsSearch {
    pub fn new(api_key: impl Into<String>, retry: RetryConfig) -> Result<Self, CloudmareError> {
        Self::with_base_url(SECURITYTRAILS_API_URL, api_key, retry)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryConfig,
    ) -> Result<Self, CloudmareError> {
        let client = reqwest::Client::builder()
            .timeout(SECURITYTRAILS_TIMEOUT)
            .build()
            .map_err(|e| CloudmareError::Internal(format!("Failed to build SecurityTrails client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry,
        })
    }

    async fn query(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let url = format!("{}/history/{}/dns/a", self.base_url, domain);
        let response = self
            .client
            .get(&url)
            .header("APIKEY", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("SecurityTrails: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CloudmareError::Config(format!(
                "SecurityTrails rejected API key {}",
                redact_key(&self.api_key)
            )));
        }
        if !status.is_success() {
            return Err(CloudmareError::ExternalServiceUnavailable(format!(
                "SecurityTrails returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: HistoryResponse = response.json().await.map_err(|e| {
            CloudmareError::ExternalServiceUnavailable(format!("SecurityTrails response: {}", e))
        })?;
        Ok(history_ips(&body))
    }
}

/// Distinct addresses, newest record first as the API lists them.
fn history_ips(body: &HistoryResponse) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    body.records
        .iter()
        .flat_map(|r| r.values.iter())
        .filter_map(|v| v.ip.as_deref())
        .filter_map(|ip| ip.parse::<IpAddr>().ok())
        .filter(|ip| seen.insert(*ip))
        .map(|ip| Candidate::new(ip.to_string()))
        .collect()
}

#[async_trait]
impl CandidateSource for SecurityTrailsSearch {
    fn name(&self) -> &str {
        "securitytrails"
    }

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        debug!(key = %redact_key(&self.api_key), domain = %domain, "Querying SecurityTrails");
        let found = with_retry("securitytrails_a_history", &self.retry, || self.query(domain)).await?;
        info!(domain = %domain, count = found.len(), "SecurityTrails candidates collected");
        Ok(found)
    }
}

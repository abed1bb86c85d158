use std::net::IpAddr;
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use crate::config::credentials::redact_key;
use crate::errors::{with_retry, CloudmareError, RetryConfig};
use crate::models::Candidate;
use super::source::CandidateSource;

pub const CENSYS_API_URL: &str = "https://search.censys.io/api";
const CENSYS_TIMEOUT: Duration = Duration::from_secs(15);
const CENSYS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    ip: String,
}

/// Hosts Censys has indexed for the domain. The credential is
/// `API_ID:SECRET`.
pub struct CensysSearch {
    client: reqwest::Client,
    base_url: String,
    api_id: String,
    secret: String,
    retry: RetryConfig,
}

impl CensysSearch {
    pub fn new(credential: &str, retry: RetryConfig) -> Result<Self, CloudmareError> {
        Self::with_base_url(CENSYS_API_URL, credential, retry)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        credential: &str,
        retry: RetryConfig,
    ) -> Result<Self, CloudmareError> {
        let (api_id, secret) = credential
            .split_once(':')
            .filter(|(id, secret)| !id.trim().is_empty() && !secret.trim().is_empty())
            .ok_or_else(|| {
                CloudmareError::Config(format!(
                    "Censys credential {} must be in API_ID:SECRET form",
                    redact_key(credential)
                ))
            })?;
        let client = reqwest::Client::builder()
            .timeout(CENSYS_TIMEOUT)
            .build()
            .map_err(|e| CloudmareError::Internal(format!("Failed to build Censys client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_id: api_id.trim().to_string(),
            secret: secret.trim().to_string(),
            retry,
        })
    }

    async fn query(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let url = format!("{}/v2/hosts/search", self.base_url);
        let per_page = CENSYS_PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_id, Some(&self.secret))
            .query(&[("q", domain), ("per_page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("Censys: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CloudmareError::Config(format!(
                "Censys rejected API credentials {}",
                redact_key(&self.secret)
            )));
        }
        if !status.is_success() {
            return Err(CloudmareError::ExternalServiceUnavailable(format!(
                "Censys returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("Censys response: {}", e)))?;
        Ok(body
            .result
            .hits
            .iter()
            .filter_map(|hit| hit.ip.parse::<IpAddr>().ok())
            .map(|ip| Candidate::new(ip.to_string()))
            .collect())
    }
}

#[async_trait]
impl CandidateSource for CensysSearch {
    fn name(&self) -> &str {
        "censys"
    }

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        debug!(api_id = %redact_key(&self.api_id), domain = %domain, "Querying Censys");
        let found = with_retry("censys_host_search", &self.retry, || self.query(domain)).await?;
        info!(domain = %domain, count = found.len(), "Censys candidates collected");
        Ok(found)
    }
}

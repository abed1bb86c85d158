use std::time::Duration;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use crate::errors::CloudmareError;

pub const INTEL_TIMEOUT: Duration = Duration::from_secs(5);

/// What the IP-intelligence service knows about a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntelAnswer {
    /// The service answered with its error marker.
    NoData,
    /// Lower-cased organisation / ASN owner text.
    Organization(String),
    /// The page carried no organisation row.
    Unlisted,
}

#[async_trait]
pub trait IntelLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<IntelAnswer, CloudmareError>;
}

/// check-host.net style `ip-info` page scraper.
pub struct CheckHostIntel {
    client: reqwest::Client,
    base_url: String,
}

impl CheckHostIntel {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CloudmareError> {
        let client = reqwest::Client::builder()
            .timeout(INTEL_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| CloudmareError::Internal(format!("Failed to build intel client: {}", e)))?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

#[async_trait]
impl IntelLookup for CheckHostIntel {
    async fn lookup(&self, host: &str) -> Result<IntelAnswer, CloudmareError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("host", host)])
            .send()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("ip-info lookup: {}", e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| CloudmareError::ExternalServiceUnavailable(format!("ip-info body: {}", e)))?;

        let answer = parse_ip_info(&body);
        debug!(host = %host, answer = ?answer, "IP intelligence lookup");
        Ok(answer)
    }
}

/// Extract the organisation row from an ip-info page.
pub fn parse_ip_info(html: &str) -> IntelAnswer {
    let document = Html::parse_document(html);

    if let Ok(error_sel) = Selector::parse("div.error") {
        if document.select(&error_sel).next().is_some() {
            return IntelAnswer::NoData;
        }
    }

    let Ok(row_sel) = Selector::parse("tr.zebra") else {
        return IntelAnswer::Unlisted;
    };
    for row in document.select(&row_sel) {
        let text: String = row.text().map(str::trim).collect();
        if let Some((_, org)) = text.split_once("Organization") {
            return IntelAnswer::Organization(org.trim().to_lowercase());
        }
    }
    IntelAnswer::Unlisted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organization_row() {
        let html = r#"<html><body><table>
            <tr class="zebra"><td>IP address</td><td>104.16.1.1</td></tr>
            <tr class="zebra"><td>Organization</td><td>Cloudflare, Inc.</td></tr>
        </table></body></html>"#;
        assert_eq!(parse_ip_info(html), IntelAnswer::Organization("cloudflare, inc.".into()));
    }

    #[test]
    fn test_parse_error_marker() {
        let html = r#"<html><body><div class="error">Unable to resolve</div></body></html>"#;
        assert_eq!(parse_ip_info(html), IntelAnswer::NoData);
    }

    #[test]
    fn test_parse_no_org_row() {
        let html = r#"<table><tr class="zebra"><td>Country</td><td>NL</td></tr></table>"#;
        assert_eq!(parse_ip_info(html), IntelAnswer::Unlisted);
    }
}

use std::str::FromStr;
use std::time::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CloudmareError;

pub const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;
pub const DEFAULT_INTEL_URL: &str = "https://check-host.net/ip-info";
/// Upper bound for both the request timeout and the inter-request delay.
pub const MAX_WAIT_SECS: f64 = 3600.0;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CloudmareConfig {
    pub scan: Option<ScanConfig>,
    pub enumeration: Option<EnumerationConfig>,
    pub intel: Option<IntelConfig>,
    pub output: Option<OutputConfig>,
    pub retry: Option<RetrySettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    pub http_timeout_seconds: Option<f64>,
    pub response_similarity_threshold: Option<f64>,
    /// `"N"` or `"MIN-MAX"` seconds between requests.
    pub delay: Option<String>,
    pub auto_force: Option<bool>,
    pub concurrency: Option<usize>,
    pub follow_redirects_default: Option<bool>,
    pub user_agent: Option<String>,
    pub random_agent: Option<bool>,
    /// `"Name: value, Other: value"`
    pub headers: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EnumerationConfig {
    pub hosts: Option<Vec<String>>,
    pub host_file: Option<String>,
    pub wordlist: Option<String>,
    pub records: Option<bool>,
    /// Extensions tried against the site name when harvesting records.
    pub record_extensions: Option<Vec<String>>,
    pub shodan_api_key: Option<String>,
    /// `API_ID:SECRET`
    pub censys_api_key: Option<String>,
    pub securitytrails_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct IntelConfig {
    pub lookup_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RetrySettings {
    pub max_retries: Option<u32>,
}

/// Inter-request pause, either fixed or drawn uniformly from a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub fn sample(&self) -> Duration {
        let secs = if self.max <= self.min {
            self.min
        } else {
            rand::thread_rng().gen_range(self.min..=self.max)
        };
        Duration::try_from_secs_f64(secs.min(MAX_WAIT_SECS)).unwrap_or_default()
    }
}

impl FromStr for DelayRange {
    type Err = CloudmareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| -> Result<f64, CloudmareError> {
            let value: f64 = part.trim().parse().map_err(|_| {
                CloudmareError::Config(format!("Invalid delay value '{}' in '{}'", part.trim(), s))
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(CloudmareError::Config(format!("Delay must be a non-negative number: '{}'", s)));
            }
            if value > MAX_WAIT_SECS {
                return Err(CloudmareError::Config(format!(
                    "Delay must not exceed {} seconds: '{}'",
                    MAX_WAIT_SECS, s
                )));
            }
            Ok(value)
        };

        let (min, max) = match s.split_once('-') {
            Some((lo, hi)) => (parse(lo)?, parse(hi)?),
            None => {
                let v = parse(s)?;
                (v, v)
            }
        };
        if min > max {
            return Err(CloudmareError::Config(format!("Delay range minimum exceeds maximum: '{}'", s)));
        }
        Ok(Self { min, max })
    }
}

/// Export formats understood by the reporting module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Txt];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Parse a comma-separated list such as `"json,csv"` or `"all"`.
    pub fn parse_list(spec: &str) -> Result<Vec<ExportFormat>, CloudmareError> {
        let mut formats = Vec::new();
        for part in spec.split(',').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "" => continue,
                "all" => return Ok(Self::ALL.to_vec()),
                other => {
                    let fmt = other.parse()?;
                    if !formats.contains(&fmt) {
                        formats.push(fmt);
                    }
                }
            }
        }
        Ok(formats)
    }
}

impl FromStr for ExportFormat {
    type Err = CloudmareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(CloudmareError::Config(format!("Unknown output format: {}", other))),
        }
    }
}

/// Merged, validated settings consumed by the classifier, comparator and
/// orchestrator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub http_timeout: Duration,
    pub similarity_threshold: f64,
    pub delay: Option<DelayRange>,
    pub auto_force: bool,
    pub concurrency: usize,
    pub follow_redirects_default: bool,
    pub user_agent: Option<String>,
    pub random_agent: bool,
    pub headers: Vec<(String, String)>,
    pub intel_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs_f64(DEFAULT_HTTP_TIMEOUT_SECS),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            delay: None,
            auto_force: false,
            concurrency: 1,
            follow_redirects_default: true,
            user_agent: None,
            random_agent: false,
            headers: Vec::new(),
            intel_url: DEFAULT_INTEL_URL.to_string(),
        }
    }
}

/// Parse `"Name: value, Other: value"` into header pairs. A `host` entry is
/// rejected: the comparator owns the Host header.
pub fn parse_header_spec(spec: &str) -> Result<Vec<(String, String)>, CloudmareError> {
    let mut headers = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, value) = entry.split_once(':').ok_or_else(|| {
            CloudmareError::Config(format!("Header '{}' is not in 'Name: value' form", entry))
        })?;
        let name = name.trim();
        if name.eq_ignore_ascii_case("host") {
            return Err(CloudmareError::Config(
                "Remove the 'host:' header from '--header'. Use '--host' instead".into(),
            ));
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_fixed() {
        let d: DelayRange = "1.5".parse().unwrap();
        assert_eq!(d, DelayRange { min: 1.5, max: 1.5 });
        assert_eq!(d.sample(), Duration::from_secs_f64(1.5));
    }

    #[test]
    fn test_delay_range_sample_within_bounds() {
        let d: DelayRange = "0.1-0.3".parse().unwrap();
        for _ in 0..50 {
            let s = d.sample().as_secs_f64();
            assert!((0.1..=0.3).contains(&s));
        }
    }

    #[test]
    fn test_delay_invalid() {
        assert!("abc".parse::<DelayRange>().is_err());
        assert!("3-1".parse::<DelayRange>().is_err());
        assert!("1-".parse::<DelayRange>().is_err());
    }

    #[test]
    fn test_delay_out_of_range_is_config_error() {
        for raw in ["1e300", "0-1e300", "3601"] {
            assert!(matches!(raw.parse::<DelayRange>(), Err(CloudmareError::Config(_))), "{raw}");
        }
        assert!("3600".parse::<DelayRange>().is_ok());
    }

    #[test]
    fn test_delay_sample_never_panics_on_literal_range() {
        let d = DelayRange { min: 1e300, max: 1e300 };
        assert_eq!(d.sample(), Duration::from_secs_f64(MAX_WAIT_SECS));
    }

    #[test]
    fn test_export_format_list() {
        assert_eq!(ExportFormat::parse_list("all").unwrap(), ExportFormat::ALL.to_vec());
        assert_eq!(
            ExportFormat::parse_list("CSV, json,csv").unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
        assert!(ExportFormat::parse_list("xml").is_err());
    }

    #[test]
    fn test_header_spec() {
        let h = parse_header_spec("X-Test: 1, Accept: text/html").unwrap();
        assert_eq!(h, vec![
            ("X-Test".to_string(), "1".to_string()),
            ("Accept".to_string(), "text/html".to_string()),
        ]);
    }

    #[test]
    fn test_header_spec_rejects_host() {
        assert!(parse_header_spec("Host: evil.com").is_err());
        assert!(parse_header_spec("broken").is_err());
    }

    #[test]
    fn test_engine_config_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.http_timeout, Duration::from_secs(5));
        assert_eq!(c.similarity_threshold, 0.9);
        assert!(!c.auto_force);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn test_config_default_empty() {
        let config = CloudmareConfig::default();
        assert!(config.scan.is_none());
        assert!(config.enumeration.is_none());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::candidate::Candidate;
use super::verdict::Provider;

/// Terminal status of a candidate. Every recorded result holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Protected,
    Exposed,
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Exposed => "exposed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for a single candidate, as recorded into the scan session.
///
/// Built only through the constructors below so that a protected result can
/// never carry a `real_ip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "subdomain")]
    pub candidate: Candidate,
    pub status: ScanStatus,
    pub real_ip: Option<String>,
    pub waf_ip: Option<String>,
    #[serde(rename = "waf_provider")]
    pub provider: Option<Provider>,
    pub similarity_score: Option<f64>,
    /// Human-readable cause for `Error` results.
    pub cause: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ComparisonResult {
    pub fn protected(candidate: Candidate, waf_ip: impl Into<String>, provider: Provider) -> Self {
        Self {
            candidate,
            status: ScanStatus::Protected,
            real_ip: None,
            waf_ip: Some(waf_ip.into()),
            provider: Some(provider),
            similarity_score: None,
            cause: None,
            timestamp: Utc::now(),
        }
    }

    pub fn exposed(candidate: Candidate, real_ip: impl Into<String>, score: f64) -> Self {
        Self {
            candidate,
            status: ScanStatus::Exposed,
            real_ip: Some(real_ip.into()),
            waf_ip: None,
            provider: None,
            similarity_score: Some(score),
            cause: None,
            timestamp: Utc::now(),
        }
    }

    /// An inconclusive or failed comparison. `score` is kept for diagnostics
    /// when the bodies were compared but fell below the threshold.
    pub fn error(candidate: Candidate, cause: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            candidate,
            status: ScanStatus::Error,
            real_ip: None,
            waf_ip: None,
            provider: None,
            similarity_score: score,
            cause: Some(cause.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_exposed(&self) -> bool {
        self.status == ScanStatus::Exposed
    }
}

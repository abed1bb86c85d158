use std::net::IpAddr;
use serde::{Deserialize, Serialize};

/// A hostname or literal IP under evaluation as a possible origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(host: impl Into<String>) -> Self {
        let host: String = host.into();
        Self(host.trim().trim_end_matches('.').to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parsed address when the candidate is already an IP literal,
    /// in which case no DNS step is needed.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_normalizes() {
        let c = Candidate::new("  Origin.Example.COM. ");
        assert_eq!(c.as_str(), "origin.example.com");
    }

    #[test]
    fn test_ip_literal() {
        assert!(Candidate::new("203.0.113.10").ip_literal().is_some());
        assert!(Candidate::new("2001:db8::1").ip_literal().is_some());
        assert!(Candidate::new("origin.example.com").ip_literal().is_none());
    }
}

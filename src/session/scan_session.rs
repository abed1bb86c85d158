use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::models::{Candidate, ComparisonResult, ScanStatus};

/// Derived counters. The three category counts always sum to
/// `total_subdomains`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounters {
    pub total_subdomains: usize,
    pub protected_by_waf: usize,
    pub potential_real_ips: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    #[serde(flatten)]
    pub counters: SummaryCounters,
    /// De-duplicated, in first-discovery order.
    pub real_ips: Vec<String>,
}

/// Owns the results of one scan. Written by a single owner while the scan
/// runs; read-only afterwards for summary and export.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSession {
    pub scan_id: String,
    pub target_domain: String,
    pub scan_date: DateTime<Utc>,
    results: Vec<ComparisonResult>,
    #[serde(skip)]
    seen: HashSet<Candidate>,
    counters: SummaryCounters,
}

impl ScanSession {
    pub fn new(target_domain: impl Into<String>) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            target_domain: target_domain.into(),
            scan_date: Utc::now(),
            results: Vec::new(),
            seen: HashSet::new(),
            counters: SummaryCounters::default(),
        }
    }

    /// Append a verdict and bump exactly one category counter. A candidate
    /// already recorded is ignored so duplicates never double-count; returns
    /// whether the result was recorded.
    pub fn record(&mut self, result: ComparisonResult) -> bool {
        if !self.seen.insert(result.candidate.clone()) {
            debug!(candidate = %result.candidate, "Duplicate candidate result ignored");
            return false;
        }

        self.counters.total_subdomains += 1;
        match result.status {
            ScanStatus::Protected => self.counters.protected_by_waf += 1,
            ScanStatus::Exposed => self.counters.potential_real_ips += 1,
            ScanStatus::Error => self.counters.errors += 1,
        }
        self.results.push(result);
        true
    }

    pub fn results(&self) -> &[ComparisonResult] {
        &self.results
    }

    pub fn counters(&self) -> SummaryCounters {
        self.counters
    }

    pub fn protected(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| r.status == ScanStatus::Protected)
    }

    pub fn exposed(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| r.status == ScanStatus::Exposed)
    }

    pub fn real_ips(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.results
            .iter()
            .filter_map(|r| r.real_ip.as_ref())
            .filter(|ip| seen.insert(ip.as_str()))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            counters: self.counters,
            real_ips: self.real_ips(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    #[test]
    fn test_empty_session_summary() {
        let session = ScanSession::new("example.com");
        let summary = session.summary();
        assert_eq!(summary.counters, SummaryCounters::default());
        assert!(summary.real_ips.is_empty());
    }

    #[test]
    fn test_record_increments_one_counter() {
        let mut s = ScanSession::new("example.com");
        s.record(ComparisonResult::protected("cdn.example.com".into(), "104.16.1.1", Provider::Cloudflare));
        s.record(ComparisonResult::exposed("origin.example.com".into(), "203.0.113.10", 1.0));
        s.record(ComparisonResult::error("dead.example.com".into(), "Connection refused", None));

        let c = s.counters();
        assert_eq!(c.total_subdomains, 3);
        assert_eq!(c.protected_by_waf, 1);
        assert_eq!(c.potential_real_ips, 1);
        assert_eq!(c.errors, 1);
    }

    #[test]
    fn test_duplicates_do_not_double_count() {
        let mut s = ScanSession::new("example.com");
        assert!(s.record(ComparisonResult::exposed("origin.example.com".into(), "203.0.113.10", 1.0)));
        assert!(!s.record(ComparisonResult::exposed("origin.example.com".into(), "203.0.113.10", 1.0)));
        assert_eq!(s.counters().total_subdomains, 1);
        assert_eq!(s.results().len(), 1);
    }

    #[test]
    fn test_real_ips_deduplicated_in_order() {
        let mut s = ScanSession::new("example.com");
        s.record(ComparisonResult::exposed("a.example.com".into(), "203.0.113.10", 0.95));
        s.record(ComparisonResult::exposed("b.example.com".into(), "203.0.113.20", 0.97));
        s.record(ComparisonResult::exposed("c.example.com".into(), "203.0.113.10", 1.0));
        assert_eq!(s.real_ips(), vec!["203.0.113.10", "203.0.113.20"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut s = ScanSession::new("example.com");
        for host in ["c.example.com", "a.example.com", "b.example.com"] {
            s.record(ComparisonResult::error(host.into(), "timeout", None));
        }
        let order: Vec<&str> = s.results().iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(order, vec!["c.example.com", "a.example.com", "b.example.com"]);
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::errors::CloudmareError;
use crate::models::ComparisonResult;
use crate::session::{ScanSession, ScanSummary};

#[derive(Serialize)]
struct JsonReport<'a> {
    scan_id: &'a str,
    target_domain: &'a str,
    scan_date: DateTime<Utc>,
    summary: ScanSummary,
    results: &'a [ComparisonResult],
}

pub fn render_json(session: &ScanSession) -> Result<String, CloudmareError> {
    let report = JsonReport {
        scan_id: &session.scan_id,
        target_domain: &session.target_domain,
        scan_date: session.scan_date,
        summary: session.summary(),
        results: session.results(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

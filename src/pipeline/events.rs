use crate::models::{Candidate, ComparisonResult};

/// Messages sent from the orchestrator to the console renderer.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    ScanStarted {
        scan_id: String,
        target: String,
        candidates: usize,
    },
    CandidateStarted {
        candidate: Candidate,
    },
    /// A result was accepted by the session (duplicates are not reported).
    ResultRecorded {
        result: ComparisonResult,
    },
    ScanCompleted {
        duration_ms: u64,
        interrupted: bool,
    },
}

pub mod scan_session;

pub use scan_session::{ScanSession, ScanSummary, SummaryCounters};

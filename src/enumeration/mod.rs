pub mod source;
pub mod hosts;
pub mod dns;
pub mod shodan;
pub mod censys;
pub mod securitytrails;

pub use source::CandidateSource;
pub use hosts::{HostFile, StaticHosts};
pub use dns::{extension_variants, DnsRecords, WordlistBrute, DEFAULT_EXTENSIONS};
pub use shodan::ShodanSearch;
pub use censys::CensysSearch;
pub use securitytrails::SecurityTrailsSearch;

use tracing::{info, warn};
use crate::errors::CloudmareError;
use crate::models::Candidate;

/// Run every source in order and concatenate their output. A failing
/// source is logged and skipped unless the failure is a configuration
/// problem, which aborts the run.
pub async fn gather(
    domain: &str,
    sources: &[Box<dyn CandidateSource>],
) -> Result<Vec<Candidate>, CloudmareError> {
    let mut all = Vec::new();
    for source in sources {
        match source.candidates(domain).await {
            Ok(found) => {
                info!(source = source.name(), count = found.len(), "Candidates gathered");
                all.extend(found);
            }
            Err(e @ CloudmareError::Config(_)) => return Err(e),
            Err(e) => warn!(source = source.name(), error = %e, "Candidate source failed, skipping"),
        }
    }
    Ok(all)
}

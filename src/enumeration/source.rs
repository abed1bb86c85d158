use async_trait::async_trait;
use crate::errors::CloudmareError;
use crate::models::Candidate;

/// Supplies candidate hosts for a target domain, in discovery order.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &str;

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError>;
}

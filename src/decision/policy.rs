use async_trait::async_trait;

/// A 301/302 answered by a candidate.
#[derive(Debug, Clone)]
pub struct RedirectPrompt {
    pub url: String,
    pub location: Option<String>,
}

/// A non-200 final response from a candidate.
#[derive(Debug, Clone)]
pub struct ForcePrompt {
    pub url: String,
    pub status: u16,
}

/// Decision points of the origin comparison. The comparator only branches
/// on the returned booleans.
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    async fn should_follow_redirect(&self, prompt: &RedirectPrompt) -> bool;

    async fn should_force_connection(&self, prompt: &ForcePrompt) -> bool;

    /// Asked after an exposed origin is found; `true` ends the scan early.
    async fn should_stop_after_exposure(&self, real_ip: &str) -> bool;

    /// Asked when the operator interrupts the scan.
    async fn confirm_abort(&self) -> bool;

    /// Whether answers block on operator input. Candidates are only
    /// processed concurrently under a non-interactive policy.
    fn is_interactive(&self) -> bool;
}

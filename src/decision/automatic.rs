use async_trait::async_trait;
use tracing::info;
use super::policy::{DecisionPolicy, ForcePrompt, RedirectPrompt};

/// Auto-force policy: always proceed, never stop early.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPolicy;

#[async_trait]
impl DecisionPolicy for AutoPolicy {
    async fn should_follow_redirect(&self, prompt: &RedirectPrompt) -> bool {
        info!(url = %prompt.url, location = ?prompt.location, "Auto-following redirect");
        true
    }

    async fn should_force_connection(&self, prompt: &ForcePrompt) -> bool {
        info!(url = %prompt.url, status = prompt.status, "Auto-forcing connection");
        true
    }

    async fn should_stop_after_exposure(&self, _real_ip: &str) -> bool {
        false
    }

    async fn confirm_abort(&self) -> bool {
        true
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Fixed answers without operator input, used when no terminal is attached
/// and auto-force is off.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    pub follow_redirects: bool,
    pub force_connection: bool,
}

#[async_trait]
impl DecisionPolicy for FixedPolicy {
    async fn should_follow_redirect(&self, _prompt: &RedirectPrompt) -> bool {
        self.follow_redirects
    }

    async fn should_force_connection(&self, _prompt: &ForcePrompt) -> bool {
        self.force_connection
    }

    async fn should_stop_after_exposure(&self, _real_ip: &str) -> bool {
        false
    }

    async fn confirm_abort(&self) -> bool {
        true
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::ui::prompt::ask_yes_no;
use super::policy::{DecisionPolicy, ForcePrompt, RedirectPrompt};

/// Operator-driven policy backed by terminal prompts. Prompts are serialized
/// so questions never interleave.
pub struct InteractivePolicy {
    follow_redirects_default: bool,
    lock: Mutex<()>,
}

impl InteractivePolicy {
    pub fn new(follow_redirects_default: bool) -> Self {
        Self { follow_redirects_default, lock: Mutex::new(()) }
    }

    async fn ask(&self, question: String, default: bool) -> bool {
        let _guard = self.lock.lock().await;
        tokio::task::spawn_blocking(move || ask_yes_no(&question, default))
            .await
            .unwrap_or(default)
    }
}

#[async_trait]
impl DecisionPolicy for InteractivePolicy {
    async fn should_follow_redirect(&self, prompt: &RedirectPrompt) -> bool {
        let target = prompt.location.as_deref().unwrap_or("an unknown location");
        self.ask(
            format!("{} redirects to {}. Do you want to follow the redirect?", prompt.url, target),
            self.follow_redirects_default,
        )
        .await
    }

    async fn should_force_connection(&self, prompt: &ForcePrompt) -> bool {
        self.ask(
            format!("Unexpected status code [{}] at {}. Do you want to force the connection anyway?", prompt.status, prompt.url),
            true,
        )
        .await
    }

    async fn should_stop_after_exposure(&self, real_ip: &str) -> bool {
        self.ask(format!("Real IP {} found. Do you want to stop the tests?", real_ip), false).await
    }

    async fn confirm_abort(&self) -> bool {
        self.ask("Interrupted. Do you want to abort the scan?".to_string(), true).await
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

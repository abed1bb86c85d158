use crate::config::DelayRange;
use tracing::trace;

/// Optional pause before each comparator request.
#[derive(Debug, Clone, Default)]
pub struct RequestPacer {
    delay: Option<DelayRange>,
}

impl RequestPacer {
    pub fn new(delay: Option<DelayRange>) -> Self {
        Self { delay }
    }

    pub async fn pause(&self) {
        if let Some(range) = &self.delay {
            let wait = range.sample();
            trace!(wait_ms = wait.as_millis() as u64, "Pacing request");
            tokio::time::sleep(wait).await;
        }
    }
}

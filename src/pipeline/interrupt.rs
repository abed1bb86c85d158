use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::decision::DecisionPolicy;

/// Listen for Ctrl-C until the scan ends. Each interrupt asks the policy to
/// confirm; a confirmed abort cancels `token`.
pub fn spawn_interrupt_handler(
    token: CancellationToken,
    policy: Arc<dyn DecisionPolicy>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        warn!(error = %e, "Cannot listen for interrupt signal");
                        break;
                    }
                    if policy.confirm_abort().await {
                        info!("Scan aborted by operator");
                        token.cancel();
                        break;
                    }
                    info!("Resuming scan");
                }
            }
        }
    })
}

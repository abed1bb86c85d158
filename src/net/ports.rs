use std::time::Duration;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::trace;

pub const PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

#[async_trait]
pub trait PortProbe: Send + Sync {
    /// True when a TCP connect to `host:port` completes within `timeout`.
    async fn is_open(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

pub struct TcpPortProbe;

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn is_open(&self, host: &str, port: u16, timeout: Duration) -> bool {
        let open = matches!(
            tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
            Ok(Ok(_))
        );
        trace!(host = %host, port, open, "Port probe");
        open
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudmareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Connection timed out: {0}")]
    NetworkTimeout(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("DNS resolution failed - host not found: {0}")]
    DnsResolution(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),

    #[error("Unexpected status code [{status}] occurred at: {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("Operator declined to force the connection: {0}")]
    UserDeclinedForce(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CloudmareError {
    /// Map a transport-level reqwest failure onto the scan error taxonomy.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let target = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let chain = error_chain_text(err);

        if err.is_timeout() {
            return Self::NetworkTimeout(target);
        }
        if let Some(kind) = io_error_kind(err) {
            match kind {
                std::io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused(target),
                std::io::ErrorKind::TimedOut => return Self::NetworkTimeout(target),
                _ => {}
            }
        }
        if chain.contains("dns error")
            || chain.contains("failed to lookup address")
            || chain.contains("name or service not known")
        {
            return Self::DnsResolution(target);
        }
        if chain.contains("tls") || chain.contains("certificate") || chain.contains("handshake") {
            return Self::TlsHandshake(target);
        }
        if chain.contains("connection refused") {
            return Self::ConnectionRefused(target);
        }
        Self::Network(format!("{}: {}", target, err))
    }
}

fn io_error_kind(err: &reqwest::Error) -> Option<std::io::ErrorKind> {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = inner.source();
    }
    None
}

fn error_chain_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_display() {
        let err = CloudmareError::UnexpectedStatus {
            status: 403,
            url: "http://203.0.113.10/".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status code [403] occurred at: http://203.0.113.10/"
        );
    }

    #[tokio::test]
    async fn test_from_reqwest_connection_refused() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::Client::new()
            .get(format!("http://{}", addr))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(
            CloudmareError::from_reqwest(&err),
            CloudmareError::ConnectionRefused(_)
        ));
    }
}

use super::types::CloudmareError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl CloudmareError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            CloudmareError::NetworkTimeout(_) => ErrorClassification {
                error_type: "NetworkTimeout",
                retryable: true,
            },
            CloudmareError::ConnectionRefused(_) => ErrorClassification {
                error_type: "ConnectionRefused",
                retryable: true,
            },
            CloudmareError::ExternalServiceUnavailable(_) => ErrorClassification {
                error_type: "ExternalServiceUnavailable",
                retryable: true,
            },
            CloudmareError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            CloudmareError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },

            // Non-retryable errors
            CloudmareError::DnsResolution(_) => ErrorClassification {
                error_type: "DNSResolutionFailure",
                retryable: false,
            },
            CloudmareError::TlsHandshake(_) => ErrorClassification {
                error_type: "TLSHandshakeFailure",
                retryable: false,
            },
            CloudmareError::UnexpectedStatus { .. } => ErrorClassification {
                error_type: "HTTPUnexpectedStatus",
                retryable: false,
            },
            CloudmareError::UserDeclinedForce(_) => ErrorClassification {
                error_type: "UserDeclinedForce",
                retryable: false,
            },
            CloudmareError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            CloudmareError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                retryable: false,
            },
            CloudmareError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            CloudmareError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            CloudmareError::Csv(_) => ErrorClassification {
                error_type: "CsvError",
                retryable: false,
            },
            CloudmareError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}

use serde::{Deserialize, Serialize};

/// Known reverse-proxy / WAF providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Sucuri,
    Cloudflare,
    Incapsula,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sucuri => "Sucuri",
            Self::Cloudflare => "Cloudflare",
            Self::Incapsula => "Incapsula",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking whether a host sits behind a protection provider.
/// Computed once per host and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ProtectionVerdict {
    Unknown,
    Protected { provider: Provider, evidence_ip: String },
    NotProtected,
}

impl ProtectionVerdict {
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected { .. })
    }

    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::Protected { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

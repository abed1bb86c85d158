use crate::models::Provider;

/// How a provider gives itself away in a `Server` header or in the
/// organisation text of an IP-intelligence lookup. Matching is a
/// case-insensitive substring search.
pub struct ProviderSignature {
    pub provider: Provider,
    pub header_markers: &'static [&'static str],
    pub org_markers: &'static [&'static str],
}

impl ProviderSignature {
    pub fn matches_header(&self, server: &str) -> bool {
        let server = server.to_lowercase();
        self.header_markers.iter().any(|m| server.contains(m))
    }

    pub fn matches_organization(&self, org: &str) -> bool {
        let org = org.to_lowercase();
        self.org_markers.iter().any(|m| org.contains(m))
    }
}

pub static SIGNATURES: &[ProviderSignature] = &[
    ProviderSignature {
        provider: Provider::Sucuri,
        header_markers: &["sucuri"],
        org_markers: &["sucuri"],
    },
    ProviderSignature {
        provider: Provider::Cloudflare,
        header_markers: &["cloudflare"],
        org_markers: &["cloudflare"],
    },
    ProviderSignature {
        provider: Provider::Incapsula,
        header_markers: &["incapsula"],
        org_markers: &["incapsula"],
    },
];

pub fn match_server_header(server: &str) -> Option<Provider> {
    SIGNATURES.iter().find(|s| s.matches_header(server)).map(|s| s.provider)
}

pub fn match_organization(org: &str) -> Option<Provider> {
    SIGNATURES.iter().find(|s| s.matches_organization(org)).map(|s| s.provider)
}

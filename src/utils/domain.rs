use std::sync::LazyLock;
use regex::Regex;
use crate::errors::CloudmareError;

static TARGET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\d*\.|mobile\.|m\d*\.)?([A-Za-z0-9.-]+)").unwrap()
});

/// Extract the bare host from a user-supplied target such as
/// `https://www.example.com/path`.
pub fn normalize_target(raw: &str) -> Result<String, CloudmareError> {
    let raw = raw.trim();
    let host = TARGET_REGEX
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('.').to_lowercase())
        .unwrap_or_default();

    if host.is_empty() || !host.contains('.') {
        return Err(CloudmareError::InvalidTarget(format!("Cannot extract a domain from '{}'", raw)));
    }
    Ok(host)
}

/// First label of the domain, used to name export files.
pub fn domain_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

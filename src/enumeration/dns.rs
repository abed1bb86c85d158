use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use crate::errors::CloudmareError;
use crate::models::Candidate;
use crate::net::{RecordKind, Resolver};
use super::hosts::parse_lines;
use super::source::CandidateSource;

const BRUTE_CONCURRENCY: usize = 20;

/// `<word>.<domain>` for every wordlist entry that resolves.
pub struct WordlistBrute {
    wordlist: PathBuf,
    resolver: Arc<dyn Resolver>,
}

impl WordlistBrute {
    pub fn new(wordlist: impl Into<PathBuf>, resolver: Arc<dyn Resolver>) -> Self {
        Self { wordlist: wordlist.into(), resolver }
    }
}

#[async_trait]
impl CandidateSource for WordlistBrute {
    fn name(&self) -> &str {
        "dns-bruteforce"
    }

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let content = tokio::fs::read_to_string(&self.wordlist).await.map_err(|e| {
            CloudmareError::Config(format!("Cannot read wordlist {}: {}", self.wordlist.display(), e))
        })?;
        let names: Vec<String> = parse_lines(&content)
            .map(|word| format!("{}.{}", word.trim_end_matches('.'), domain))
            .collect();
        info!(domain = %domain, words = names.len(), "Bruteforcing subdomains");

        // `buffered` keeps wordlist order.
        let found: Vec<Candidate> = stream::iter(names)
            .map(|name| {
                let resolver = self.resolver.clone();
                async move {
                    match resolver.resolve(&name).await {
                        Ok(ip) => {
                            debug!(host = %name, ip = %ip, "Subdomain resolves");
                            Some(Candidate::new(name))
                        }
                        Err(_) => None,
                    }
                }
            })
            .buffered(BRUTE_CONCURRENCY)
            .filter_map(|c| async move { c })
            .collect()
            .await;
        Ok(found)
    }
}

/// Extensions tried against the site name when no list is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".com", ".net", ".org", ".io", ".co", ".info", ".biz", ".us", ".co.uk", ".de",
    ".fr", ".es", ".it", ".nl", ".eu", ".ru", ".com.br", ".in", ".ca", ".com.au",
];

/// Mail exchanger and name server hosts of the domain and of its sibling
/// registrations (`shop.com` also asks `shop.net`, `shop.org`, ...).
pub struct DnsRecords {
    resolver: Arc<dyn Resolver>,
    extensions: Vec<String>,
}

impl DnsRecords {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    async fn harvest(&self, name: &str, quiet: bool, found: &mut Vec<Candidate>, seen: &mut HashSet<String>) {
        for kind in [RecordKind::Mx, RecordKind::Ns] {
            match self.resolver.records(name, kind).await {
                Ok(targets) => {
                    for target in targets {
                        let target = target.trim_end_matches('.').to_lowercase();
                        if target.is_empty() || !seen.insert(target.clone()) {
                            continue;
                        }
                        debug!(record = kind.as_str(), host = %target, from = %name, "DNS record target");
                        found.push(Candidate::new(target));
                    }
                }
                Err(e) if quiet => debug!(record = kind.as_str(), domain = %name, error = %e, "No record for variant"),
                Err(e) => warn!(record = kind.as_str(), domain = %name, error = %e, "DNS record lookup failed"),
            }
        }
    }
}

/// `www.shop.com` with `[".net", ".com"]` gives `["shop.net"]`; the target
/// itself is never a variant.
pub fn extension_variants(domain: &str, extensions: &[String]) -> Vec<String> {
    let host = domain.trim_end_matches('.').to_lowercase();
    let bare = host.strip_prefix("www.").unwrap_or(&host);
    let Some(site) = bare.split('.').next().filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    let mut variants = Vec::new();
    for ext in extensions {
        let ext = ext.trim().to_lowercase();
        if ext.trim_start_matches('.').is_empty() {
            continue;
        }
        let variant = format!("{}.{}", site, ext.trim_start_matches('.'));
        if variant != bare && variant != host && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

#[async_trait]
impl CandidateSource for DnsRecords {
    fn name(&self) -> &str {
        "dns-records"
    }

    async fn candidates(&self, domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        self.harvest(domain, false, &mut found, &mut seen).await;

        let variants = extension_variants(domain, &self.extensions);
        info!(domain = %domain, variants = variants.len(), "Checking domain extensions for DNS records");
        for variant in &variants {
            self.harvest(variant, true, &mut found, &mut seen).await;
        }
        Ok(found)
    }
}

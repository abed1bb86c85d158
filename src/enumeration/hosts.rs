use std::path::PathBuf;
use async_trait::async_trait;
use crate::errors::CloudmareError;
use crate::models::Candidate;
use super::source::CandidateSource;

/// Hosts given explicitly on the command line or in the config file.
pub struct StaticHosts {
    hosts: Vec<String>,
}

impl StaticHosts {
    pub fn new(hosts: Vec<String>) -> Self {
        Self { hosts }
    }
}

#[async_trait]
impl CandidateSource for StaticHosts {
    fn name(&self) -> &str {
        "hosts"
    }

    async fn candidates(&self, _domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        Ok(self
            .hosts
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| Candidate::new(h.as_str()))
            .collect())
    }
}

/// One candidate per line; blank lines and `#` comments are skipped.
pub struct HostFile {
    path: PathBuf,
}

impl HostFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub(crate) fn parse_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

#[async_trait]
impl CandidateSource for HostFile {
    fn name(&self) -> &str {
        "host-file"
    }

    async fn candidates(&self, _domain: &str) -> Result<Vec<Candidate>, CloudmareError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CloudmareError::Config(format!("Cannot read host file {}: {}", self.path.display(), e))
        })?;
        Ok(parse_lines(&content).map(Candidate::new).collect())
    }
}

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::debug;
use crate::config::EngineConfig;
use crate::errors::CloudmareError;
use crate::utils::truncation::MAX_BODY_LENGTH;
use super::agents::{random_user_agent, BROWSER_HEADERS, BROWSER_USER_AGENTS};

/// Bytes read from a body before the rest is dropped. The slack past the
/// scoring window keeps a multi-byte character at the cut intact.
const BODY_READ_LIMIT: usize = MAX_BODY_LENGTH + 4096;

/// Per-request knobs for a probe.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Overrides the `Host` header, used to ask a bare IP for a virtual host.
    pub host_header: Option<String>,
    pub follow_redirects: bool,
}

impl FetchOptions {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, host_header: None, follow_redirects: true }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host_header = Some(host.into());
        self
    }

    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// URL after any redirects the client followed.
    pub final_url: String,
    /// Header names are lower-case.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302)
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// `host[:port]` of the final URL, the value a direct request must send as
    /// its Host header to reach the same virtual host.
    pub fn effective_host(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.final_url).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str, opts: &FetchOptions) -> Result<HttpResponse, CloudmareError>;
}

/// reqwest-backed probe. Certificate checks are off: a direct-IP request can
/// never present a matching certificate.
pub struct ReqwestProbe {
    following: reqwest::Client,
    direct: reqwest::Client,
    extra_headers: HeaderMap,
    user_agent: Option<String>,
    random_agent: bool,
}

impl ReqwestProbe {
    pub fn new(config: &EngineConfig) -> Result<Self, CloudmareError> {
        let mut defaults = HeaderMap::new();
        for (name, value) in BROWSER_HEADERS {
            defaults.insert(*name, HeaderValue::from_static(*value));
        }

        // Cookies set along a redirect chain are replayed like a browser would.
        let build = |policy: Policy, cookies: bool| {
            reqwest::Client::builder()
                .danger_accept_invalid_certs(true)
                .cookie_store(cookies)
                .redirect(policy)
                .default_headers(defaults.clone())
                .build()
                .map_err(|e| CloudmareError::Internal(format!("Failed to build HTTP client: {}", e)))
        };

        let mut extra_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CloudmareError::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CloudmareError::Config(format!("Invalid header value '{}': {}", value, e)))?;
            extra_headers.insert(name, value);
        }

        Ok(Self {
            following: build(Policy::limited(10), true)?,
            direct: build(Policy::none(), false)?,
            extra_headers,
            user_agent: config.user_agent.clone(),
            random_agent: config.random_agent,
        })
    }

    fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(ua) => ua.clone(),
            None if self.random_agent => random_user_agent().to_string(),
            None => BROWSER_USER_AGENTS[0].to_string(),
        }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, opts: &FetchOptions) -> Result<HttpResponse, CloudmareError> {
        let client = if opts.follow_redirects { &self.following } else { &self.direct };

        let mut request = client
            .get(url)
            .timeout(opts.timeout)
            .headers(self.extra_headers.clone())
            .header(USER_AGENT, self.user_agent());
        if let Some(host) = &opts.host_header {
            request = request.header(HOST, host.as_str());
        }

        let response = request.send().await.map_err(|e| CloudmareError::from_reqwest(&e))?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_lowercase(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = read_capped(response).await?;

        debug!(url = %url, status, final_url = %final_url, bytes = body.len(), "HTTP probe complete");

        Ok(HttpResponse { status, final_url, headers, body })
    }
}

/// Stream the body until [`BODY_READ_LIMIT`] bytes have arrived.
async fn read_capped(mut response: reqwest::Response) -> Result<String, CloudmareError> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| CloudmareError::from_reqwest(&e))? {
        let room = BODY_READ_LIMIT - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            debug!(limit = BODY_READ_LIMIT, "Body truncated at read limit");
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            final_url: url.to_string(),
            headers: HashMap::from([("location".to_string(), "/next".to_string())]),
            body: String::new(),
        }
    }

    #[test]
    fn test_effective_host() {
        assert_eq!(response("http://www.example.com/home").effective_host().as_deref(), Some("www.example.com"));
        assert_eq!(response("http://127.0.0.1:8080/").effective_host().as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(response("https://example.com:443/").effective_host().as_deref(), Some("example.com"));
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let r = response("http://example.com/");
        assert_eq!(r.header("Location"), Some("/next"));
        assert_eq!(r.location(), Some("/next"));
    }

    #[test]
    fn test_is_redirect() {
        let mut r = response("http://example.com/");
        r.status = 302;
        assert!(r.is_redirect());
        r.status = 307;
        assert!(!r.is_redirect());
    }

    #[test]
    fn test_fetch_options_builders() {
        let opts = FetchOptions::new(Duration::from_secs(3)).with_host("example.com").no_redirects();
        assert_eq!(opts.host_header.as_deref(), Some("example.com"));
        assert!(!opts.follow_redirects);
    }

    #[test]
    fn test_probe_rejects_bad_header() {
        let config = EngineConfig {
            headers: vec![("bad header".to_string(), "x".to_string())],
            ..EngineConfig::default()
        };
        assert!(ReqwestProbe::new(&config).is_err());
    }
}

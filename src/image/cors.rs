use tracing::debug;

use crate::image::cache::ProxyUrlCache;

pub const DEFAULT_BACKEND_BASE: &str = "http://127.0.0.1:8000";

pub const PROXY_PATH: &str = "/proxy/image";

/// Hosts known to refuse cross-origin image loads.
pub const DEFAULT_CORS_DOMAINS: [&str; 7] = [
    "static01.nyt.com",
    "i.abcnewsfe.com",
    "ca-times.brightspotcdn.com",
    "cdn.cnn.com",
    "media.cnn.com",
    "www.reuters.com",
    "media.reuters.com",
];

/// Decides which image URLs are worth routing through the backend proxy and
/// builds the proxied form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    domains: Vec<String>,
    backend_base: String,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_CORS_DOMAINS.iter().map(|d| d.to_string()),
            DEFAULT_BACKEND_BASE,
        )
    }
}

impl CorsPolicy {
    pub fn new<I, S>(domains: I, backend_base: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains = domains
            .into_iter()
            .map(Into::into)
            .map(|d: String| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            domains,
            backend_base: backend_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn backend_base(&self) -> &str {
        &self.backend_base
    }

    /// Substring match against the configured domains.
    pub fn is_likely_cors_blocked(&self, url: &str) -> bool {
        !url.is_empty() && self.domains.iter().any(|domain| url.contains(domain.as_str()))
    }

    pub fn is_proxied(&self, url: &str) -> bool {
        url.starts_with(&format!("{}{PROXY_PATH}?url=", self.backend_base))
    }

    /// Only RFC 3986 unreserved characters stay literal, so `!'()*` are
    /// escaped too. The proxy decodes the `url` parameter either way.
    pub fn proxy_url(&self, url: &str) -> String {
        format!(
            "{}{PROXY_PATH}?url={}",
            self.backend_base,
            urlencoding::encode(url)
        )
    }

    /// Rewrites a failed URL to its proxied form, or declines when the URL is
    /// not on a CORS-hostile domain or already goes through the proxy.
    pub async fn mitigate(&self, url: &str, cache: &ProxyUrlCache) -> Option<String> {
        if self.is_proxied(url) {
            debug!("{} already goes through the image proxy", url);
            return None;
        }

        if !self.is_likely_cors_blocked(url) {
            return None;
        }

        Some(cache.get_or_compute(url, |u| self.proxy_url(u)).await)
    }
}

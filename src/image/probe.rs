use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use tracing::debug;
use url::Url;

use crate::image::{error::ProbeError, select::is_valid_image_url};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Checks whether a URL can be loaded as an image. Resolves to the same URL on
/// success.
#[async_trait]
pub trait ImageProber: Send + Sync {
    async fn probe(&self, url: &str) -> Result<String, ProbeError>;
}

/// Probes over HTTP: the response must be 2xx, typed as an image, and carry a
/// body. Each probe is bounded by `timeout`.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("news-imagery/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn load(&self, url: &str, parsed: Url) -> Result<String, ProbeError> {
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| ProbeError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_image_content_type(&content_type) {
            return Err(ProbeError::NotAnImage {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.bytes().await.map_err(|source| ProbeError::Request {
            url: url.to_string(),
            source,
        })?;

        if body.is_empty() {
            return Err(ProbeError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!("Probed {} ({}, {} bytes)", url, content_type, body.len());
        Ok(url.to_string())
    }
}

#[async_trait]
impl ImageProber for HttpProber {
    async fn probe(&self, url: &str) -> Result<String, ProbeError> {
        if !is_valid_image_url(url) {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let parsed = Url::parse(url).map_err(|_| ProbeError::InvalidUrl {
            url: url.to_string(),
        })?;

        tokio::time::timeout(self.timeout, self.load(url, parsed))
            .await
            .unwrap_or_else(|_| {
                Err(ProbeError::Timeout {
                    url: url.to_string(),
                    timeout: self.timeout,
                })
            })
    }
}

fn is_image_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("image/") || mime == "application/octet-stream"
}

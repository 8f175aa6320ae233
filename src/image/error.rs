use std::time::Duration;

use thiserror::Error;

/// Failure to load a candidate URL as an image. Every variant carries the URL
/// that was probed.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to load image: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Image request for {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Resource at {url} is not an image (content type '{content_type}')")]
    NotAnImage { url: String, content_type: String },

    #[error("Image at {url} has an empty body")]
    EmptyBody { url: String },

    #[error("Image at {url} did not load within {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Not a loadable image URL: {url}")]
    InvalidUrl { url: String },
}

impl ProbeError {
    pub fn url(&self) -> &str {
        match self {
            ProbeError::Request { url, .. }
            | ProbeError::Status { url, .. }
            | ProbeError::NotAnImage { url, .. }
            | ProbeError::EmptyBody { url }
            | ProbeError::Timeout { url, .. }
            | ProbeError::InvalidUrl { url } => url,
        }
    }
}

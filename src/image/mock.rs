use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::image::{error::ProbeError, probe::ImageProber};

/// In-memory prober: URLs in the reachable set load, everything else fails
/// with a 404. Records every probed URL in order.
#[derive(Default)]
pub struct MockProber {
    reachable: HashSet<String>,
    probed: Mutex<Vec<String>>,
}

impl MockProber {
    pub fn new<I, S>(reachable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reachable: reachable.into_iter().map(Into::into).collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    /// A prober for which nothing loads.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub async fn probed(&self) -> Vec<String> {
        self.probed.lock().await.clone()
    }
}

#[async_trait]
impl ImageProber for MockProber {
    async fn probe(&self, url: &str) -> Result<String, ProbeError> {
        self.probed.lock().await.push(url.to_string());

        if self.reachable.contains(url) {
            Ok(url.to_string())
        } else {
            Err(ProbeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }
}

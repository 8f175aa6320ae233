use std::sync::Arc;

use futures::{stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::article::Article;
use crate::image::{
    cache::ProxyUrlCache,
    cors::CorsPolicy,
    placeholder::Placeholder,
    probe::{HttpProber, ImageProber},
    select::select_candidate,
};
use crate::config::ResolverConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Original,
    Proxied,
    Placeholder,
}

/// The displayable URL for one article and the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub source: ImageSource,
}

impl Resolution {
    fn placeholder(article: &Article) -> Self {
        Self {
            url: Placeholder::for_article(article).url,
            source: ImageSource::Placeholder,
        }
    }
}

/// Runs the fallback chain: candidate -> probe -> CORS proxy -> probe ->
/// placeholder. Always yields a URL.
#[derive(Clone)]
pub struct ImageResolver {
    prober: Arc<dyn ImageProber>,
    policy: CorsPolicy,
    cache: ProxyUrlCache,
}

impl ImageResolver {
    pub fn new(prober: Arc<dyn ImageProber>, policy: CorsPolicy, cache: ProxyUrlCache) -> Self {
        Self {
            prober,
            policy,
            cache,
        }
    }

    /// Resolver backed by an [`HttpProber`] with a fresh cache.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let prober = HttpProber::new(config.probe_timeout)?;

        Ok(Self::new(
            Arc::new(prober),
            config.cors_policy(),
            ProxyUrlCache::new(),
        ))
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ProxyUrlCache {
        &self.cache
    }

    pub async fn resolve(&self, article: &Article) -> String {
        self.resolve_detailed(article, None).await.url
    }

    pub async fn resolve_with_previous(&self, article: &Article, previous: Option<&str>) -> String {
        self.resolve_detailed(article, previous).await.url
    }

    pub async fn resolve_detailed(&self, article: &Article, previous: Option<&str>) -> Resolution {
        let Some(candidate) = select_candidate(article, previous) else {
            debug!("No image fields for article: {}", article.display_title());
            return Resolution::placeholder(article);
        };

        match self.prober.probe(&candidate).await {
            Ok(url) => {
                let source = if self.policy.is_proxied(&url) {
                    ImageSource::Proxied
                } else {
                    ImageSource::Original
                };
                return Resolution { url, source };
            }
            Err(e) => debug!("Original image failed: {}", e),
        }

        if let Some(proxied) = self.policy.mitigate(&candidate, &self.cache).await {
            debug!("Trying CORS proxy for {}", candidate);

            match self.prober.probe(&proxied).await {
                Ok(url) => {
                    return Resolution {
                        url,
                        source: ImageSource::Proxied,
                    }
                }
                Err(e) => warn!("CORS proxy also failed: {}", e),
            }
        }

        info!("Using placeholder for article: {}", article.display_title());
        Resolution::placeholder(article)
    }

    /// Resolves a batch with at most `concurrency` chains in flight.
    /// Output order follows input order.
    pub async fn resolve_many(&self, articles: &[Article], concurrency: usize) -> Vec<Resolution> {
        let pending: Vec<_> = articles
            .iter()
            .map(|article| self.resolve_detailed(article, None))
            .collect();

        stream::iter(pending)
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

/// Immediate URL without any network access: the selected candidate as-is, or
/// a placeholder. Meant to be shown while [`ImageResolver::resolve`] runs.
pub fn best_guess(article: &Article) -> String {
    select_candidate(article, None).unwrap_or_else(|| Placeholder::for_article(article).url)
}

/// Logs every image-looking field of an article and returns its best guess.
pub fn debug_article_images(article: &Article) -> String {
    debug!("Image debug for: {}", article.display_title());

    for (field, value) in article.image_fields() {
        debug!("  {}: {}", field, value);
    }

    let best = best_guess(article);
    debug!("Best image URL found: {}", best);
    best
}

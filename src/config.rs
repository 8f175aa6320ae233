use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::image::{
    cors::{CorsPolicy, DEFAULT_BACKEND_BASE, DEFAULT_CORS_DOMAINS},
    probe::DEFAULT_PROBE_TIMEOUT,
};

pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("Error reading CORS domain list from {path}")]
    ReadDomains {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CORS domain list in {path} is not a JSON array of strings")]
    ParseDomains {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub backend_base: String,
    pub probe_timeout: Duration,
    pub cors_domains: Vec<String>,
    pub batch_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            backend_base: DEFAULT_BACKEND_BASE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            cors_domains: DEFAULT_CORS_DOMAINS.iter().map(|d| d.to_string()).collect(),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl ResolverConfig {
    /// Reads `IMAGE_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup("IMAGE_BACKEND_BASE").filter(|b| !b.trim().is_empty()) {
            config.backend_base = base.trim().to_string();
        }

        if let Some(value) = lookup("IMAGE_PROBE_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs >= 1)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "IMAGE_PROBE_TIMEOUT_SECS",
                    value: value.clone(),
                })?;
            config.probe_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup("IMAGE_BATCH_CONCURRENCY") {
            config.batch_concurrency = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "IMAGE_BATCH_CONCURRENCY",
                    value: value.clone(),
                })?;
        }

        if let Some(path) = lookup("IMAGE_CORS_DOMAINS_FILE") {
            config.cors_domains = read_domain_file(PathBuf::from(path))?;
        } else if let Some(list) = lookup("IMAGE_CORS_DOMAINS") {
            config.cors_domains = list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn cors_policy(&self) -> CorsPolicy {
        CorsPolicy::new(self.cors_domains.iter().cloned(), &self.backend_base)
    }
}

fn read_domain_file(path: PathBuf) -> Result<Vec<String>, ConfigError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::ReadDomains { path, source }),
    };

    serde_json::from_str(&contents).map_err(|source| ConfigError::ParseDomains { path, source })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.backend_base, "http://127.0.0.1:8000");
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.cors_domains.len(), 7);
    }

    #[test]
    fn test_overrides() {
        let config = ResolverConfig::from_lookup(lookup(&[
            ("IMAGE_BACKEND_BASE", "https://api.news.test/"),
            ("IMAGE_PROBE_TIMEOUT_SECS", "3"),
            ("IMAGE_BATCH_CONCURRENCY", "2"),
            ("IMAGE_CORS_DOMAINS", "img.example.com, ,cdn.example.org"),
        ]))
        .unwrap();

        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.batch_concurrency, 2);
        assert_eq!(config.cors_domains, vec!["img.example.com", "cdn.example.org"]);

        let policy = config.cors_policy();
        assert_eq!(policy.backend_base(), "https://api.news.test");
        assert!(policy.is_likely_cors_blocked("https://cdn.example.org/a.jpg"));
        assert!(!policy.is_likely_cors_blocked("https://static01.nyt.com/a.jpg"));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = ResolverConfig::from_lookup(lookup(&[("IMAGE_PROBE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "IMAGE_PROBE_TIMEOUT_SECS",
                ..
            }
        ));

        let err = ResolverConfig::from_lookup(lookup(&[("IMAGE_PROBE_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "IMAGE_PROBE_TIMEOUT_SECS",
                ..
            }
        ));

        let err = ResolverConfig::from_lookup(lookup(&[("IMAGE_BATCH_CONCURRENCY", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "IMAGE_BATCH_CONCURRENCY",
                ..
            }
        ));
    }

    #[test]
    fn test_domain_file_wins_over_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["images.example.net", "photos.example.net"]"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ResolverConfig::from_lookup(lookup(&[
            ("IMAGE_CORS_DOMAINS_FILE", path.as_str()),
            ("IMAGE_CORS_DOMAINS", "ignored.example"),
        ]))
        .unwrap();

        assert_eq!(
            config.cors_domains,
            vec!["images.example.net", "photos.example.net"]
        );
    }

    #[test]
    fn test_bad_domain_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"domains": 1}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let err = ResolverConfig::from_lookup(lookup(&[("IMAGE_CORS_DOMAINS_FILE", path.as_str())]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseDomains { .. }));

        let err = ResolverConfig::from_lookup(lookup(&[(
            "IMAGE_CORS_DOMAINS_FILE",
            "/nonexistent/news-imagery/domains.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReadDomains { .. }));
    }
}

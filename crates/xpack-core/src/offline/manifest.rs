//! Cache version tag, pre-cache manifest and routing configuration.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::CacheError;

/// Current cache generation. Bump to invalidate every cached entry.
pub const CACHE_NAME: &str = "xpack-v1";

/// Assets fetched eagerly at install
pub const STATIC_ASSETS: [&str; 8] = [
    "/static/css/app.css",
    "/static/js/wizard.js",
    "/static/manifest.json",
    "/static/icons/icon-192x192.png",
    "/static/icons/icon-512x512.png",
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css",
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.0/font/bootstrap-icons.css",
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js",
];

/// Path prefix of local static files (served cache-first)
pub const STATIC_PREFIX: &str = "/static/";

/// External hosts served cache-first
pub const CDN_HOSTS: [&str; 1] = ["cdn.jsdelivr.net"];

/// Origin the relative manifest entries resolve against
pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub cache_name: String,
    pub origin: String,
    pub static_prefix: String,
    pub cdn_hosts: Vec<String>,
    pub assets: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            static_prefix: STATIC_PREFIX.to_string(),
            cdn_hosts: CDN_HOSTS.iter().map(|h| h.to_string()).collect(),
            assets: STATIC_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl WorkerConfig {
    pub fn with_cache_name(mut self, name: &str) -> Self {
        self.cache_name = name.to_string();
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    pub fn origin_url(&self) -> Result<Url, CacheError> {
        Url::parse(&self.origin).map_err(|e| CacheError::InvalidUrl(format!("{}: {}", self.origin, e)))
    }

    /// Resolve a manifest entry (absolute or origin-relative)
    pub fn resolve(&self, asset: &str) -> Result<Url, CacheError> {
        self.origin_url()?
            .join(asset)
            .map_err(|e| CacheError::InvalidUrl(format!("{}: {}", asset, e)))
    }

    /// Resolve every manifest entry
    pub fn manifest(&self) -> Result<Vec<Url>, CacheError> {
        self.assets.iter().map(|a| self.resolve(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_resolves_relative_and_absolute() {
        let config = WorkerConfig::default().with_origin("https://xpack.example.com");
        let urls = config.manifest().expect("manifest resolves");

        assert_eq!(urls.len(), 8);
        assert_eq!(urls[0].as_str(), "https://xpack.example.com/static/css/app.css");
        assert_eq!(urls[5].host_str(), Some("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_bad_origin() {
        let config = WorkerConfig::default().with_origin("not a url");
        assert!(matches!(config.manifest(), Err(CacheError::InvalidUrl(_))));
    }
}

//! The asset cache worker.
//!
//! Lifecycle, driven by the host:
//! 1. `install()` pre-caches the manifest into the store named by the
//!    version tag and asks to skip waiting.
//! 2. `activate()` deletes every store with another name and claims clients.
//! 3. `handle_fetch()` intercepts GET requests: static assets and CDN files
//!    cache-first, HTML documents network-first, everything else untouched.

use futures::future::try_join_all;
use reqwest::Url;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::manifest::WorkerConfig;
use super::storage::{CacheEntry, CacheStorage};
use super::{CacheError, Method, Network, Request, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this worker will never activate
    Redundant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub phase: LifecyclePhase,
    /// Activate as soon as installed, without waiting for old workers
    pub skip_waiting: bool,
    /// Controls already-open pages
    pub clients_claimed: bool,
}

/// Strategy chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    CacheFirst,
    NetworkFirst,
    Passthrough,
}

/// Result of an intercepted fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Served by the worker
    Respond(Response),
    /// Not intercepted; the host performs the request itself
    Passthrough,
}

pub struct AssetCacheWorker<N, S> {
    config: WorkerConfig,
    network: N,
    storage: S,
    status: RwLock<WorkerStatus>,
}

impl<N: Network, S: CacheStorage> AssetCacheWorker<N, S> {
    pub fn new(config: WorkerConfig, network: N, storage: S) -> Self {
        Self {
            config,
            network,
            storage,
            status: RwLock::new(WorkerStatus {
                phase: LifecyclePhase::Parsed,
                skip_waiting: false,
                clients_claimed: false,
            }),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn status(&self) -> WorkerStatus {
        self.status.read().await.clone()
    }

    async fn set_phase(&self, phase: LifecyclePhase) {
        self.status.write().await.phase = phase;
    }

    // ===== Install =====

    /// Pre-cache every manifest asset. All-or-nothing: if any asset fails to
    /// fetch or answers with a non-2xx status, nothing is stored and the
    /// worker becomes redundant. Returns the number of assets cached.
    pub async fn install(&self) -> Result<usize, CacheError> {
        {
            let mut status = self.status.write().await;
            status.phase = LifecyclePhase::Installing;
            status.skip_waiting = true;
        }

        match self.precache().await {
            Ok(count) => {
                self.set_phase(LifecyclePhase::Installed).await;
                info!(cache = %self.config.cache_name, assets = count, "Worker installed");
                Ok(count)
            }
            Err(e) => {
                self.set_phase(LifecyclePhase::Redundant).await;
                warn!(cache = %self.config.cache_name, error = %e, "Worker install failed");
                Err(e)
            }
        }
    }

    /// Fill the current store, removing it again on failure when this
    /// install created it. A store left by an earlier install is kept.
    async fn precache(&self) -> Result<usize, CacheError> {
        let name = &self.config.cache_name;
        let existed = self.storage.keys().await?.iter().any(|k| k == name);
        self.storage.open(name).await?;

        let result = self.fill(name).await;
        if result.is_err() && !existed {
            if let Err(e) = self.storage.delete(name).await {
                warn!(cache = %name, error = %e, "Failed to remove partial cache");
            }
        }
        result
    }

    async fn fill(&self, name: &str) -> Result<usize, CacheError> {
        let urls = self.config.manifest()?;
        let fetches = urls.into_iter().map(|url| async move {
            let request = Request::get(url);
            let response = self.network.fetch(&request).await?;
            if !response.ok() {
                return Err(CacheError::HttpStatus {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            Ok::<_, CacheError>((request.cache_key(), response))
        });
        let fetched = try_join_all(fetches).await?;

        for (key, response) in &fetched {
            self.storage.put(name, key, response).await?;
        }
        Ok(fetched.len())
    }

    // ===== Activate =====

    /// Delete every store not named by the current version tag, then claim
    /// open clients. Returns the names deleted.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.set_phase(LifecyclePhase::Activating).await;

        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name != self.config.cache_name && self.storage.delete(&name).await? {
                debug!(cache = %name, "Removed stale cache");
                deleted.push(name);
            }
        }

        let mut status = self.status.write().await;
        status.clients_claimed = true;
        status.phase = LifecyclePhase::Activated;
        info!(cache = %self.config.cache_name, removed = deleted.len(), "Worker activated");
        Ok(deleted)
    }

    // ===== Fetch =====

    fn is_cdn_host(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| self.config.cdn_hosts.iter().any(|cdn| host.contains(cdn.as_str())))
            .unwrap_or(false)
    }

    /// Pick the strategy for a request
    pub fn route(&self, request: &Request) -> Route {
        if request.method != Method::Get {
            return Route::Passthrough;
        }
        if request.url.path().starts_with(&self.config.static_prefix) || self.is_cdn_host(&request.url) {
            return Route::CacheFirst;
        }
        if request.accepts_html() {
            return Route::NetworkFirst;
        }
        Route::Passthrough
    }

    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, CacheError> {
        let response = match self.route(request) {
            Route::CacheFirst => self.cache_first(request).await?,
            Route::NetworkFirst => self.network_first(request).await?,
            Route::Passthrough => return Ok(FetchOutcome::Passthrough),
        };
        Ok(FetchOutcome::Respond(response))
    }

    async fn cache_first(&self, request: &Request) -> Result<Response, CacheError> {
        let key = request.cache_key();
        if let Some(cached) = self.storage.match_key(&key).await? {
            debug!(url = %request.url, "Cache hit");
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        self.store(&key, &response).await;
        Ok(response)
    }

    async fn network_first(&self, request: &Request) -> Result<Response, CacheError> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(&request.cache_key(), &response).await;
                Ok(response)
            }
            Err(e) => {
                let cached = self.storage.match_key(&request.cache_key()).await.unwrap_or_else(|lookup| {
                    warn!(url = %request.url, error = %lookup, "Cache lookup failed");
                    None
                });
                match cached {
                    Some(response) => {
                        debug!(url = %request.url, error = %e, "Network failed, serving cached copy");
                        Ok(response)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Keep a copy of a successful response. Failures are logged, never
    /// surfaced to the caller.
    async fn store(&self, key: &str, response: &Response) {
        if !response.ok() {
            return;
        }
        if let Err(e) = self.storage.put(&self.config.cache_name, key, response).await {
            warn!(key, error = %e, "Failed to cache response");
        }
    }

    /// Entries of the current store
    pub async fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        self.storage.entries(&self.config.cache_name).await
    }
}

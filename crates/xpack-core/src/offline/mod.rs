//! Offline support: an asset cache worker.
//!
//! The worker pre-caches a fixed manifest on install, drops stale cache
//! generations on activate and intercepts GET requests afterwards. Network
//! and storage are traits so hosts and tests can supply their own.

mod disk;
mod error;
mod manifest;
mod network;
mod request;
mod storage;
mod worker;

pub use disk::DiskCacheStorage;
pub use error::CacheError;
pub use manifest::{WorkerConfig, CACHE_NAME, CDN_HOSTS, DEFAULT_ORIGIN, STATIC_ASSETS, STATIC_PREFIX};
pub use network::{HttpNetwork, Network};
pub use request::{Method, Request, Response};
pub use storage::{CacheEntry, CacheStorage, CachedData, MemoryCacheStorage};
pub use worker::{AssetCacheWorker, FetchOutcome, LifecyclePhase, Route, WorkerStatus};

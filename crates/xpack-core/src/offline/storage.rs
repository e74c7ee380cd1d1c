//! Named cache stores.
//!
//! A `CacheStorage` holds any number of named stores; each store maps a
//! request key to a response. The worker only ever writes to the store named
//! by its version tag and deletes the others on activation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{CacheError, Response};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// One cached response and the key it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub cached: CachedData<Response>,
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it does not exist
    async fn open(&self, name: &str) -> Result<(), CacheError>;

    /// Names of all stores, in creation order
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Delete a whole store. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;

    /// Store a response, creating the store if needed. Last writer wins.
    async fn put(&self, name: &str, key: &str, response: &Response) -> Result<(), CacheError>;

    /// Look a key up across all stores, oldest store first
    async fn match_key(&self, key: &str) -> Result<Option<Response>, CacheError>;

    /// Everything in one store
    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, CacheError>;
}

/// In-process cache storage
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    stores: RwLock<Vec<(String, Vec<CacheEntry>)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheError> {
        let mut stores = self.stores.write().await;
        if !stores.iter().any(|(n, _)| n == name) {
            stores.push((name.to_string(), Vec::new()));
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let stores = self.stores.read().await;
        Ok(stores.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut stores = self.stores.write().await;
        let before = stores.len();
        stores.retain(|(n, _)| n != name);
        Ok(stores.len() != before)
    }

    async fn put(&self, name: &str, key: &str, response: &Response) -> Result<(), CacheError> {
        let mut stores = self.stores.write().await;
        let index = match stores.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                stores.push((name.to_string(), Vec::new()));
                stores.len() - 1
            }
        };

        let entries = &mut stores[index].1;
        let entry = CacheEntry {
            key: key.to_string(),
            cached: CachedData::new(response.clone()),
        };
        match entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn match_key(&self, key: &str) -> Result<Option<Response>, CacheError> {
        let stores = self.stores.read().await;
        Ok(stores
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .find(|e| e.key == key)
            .map(|e| e.cached.data.clone()))
    }

    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, CacheError> {
        let stores = self.stores.read().await;
        Ok(stores
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.clone())
            .unwrap_or_default())
    }
}

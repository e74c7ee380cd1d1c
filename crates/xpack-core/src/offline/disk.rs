//! Cache storage persisted on disk.
//!
//! Layout: one directory per store under the root, one JSON file per entry.
//! Entry files are named by the SHA-256 of the request key so arbitrary URLs
//! map to safe, fixed-length file names.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use super::storage::{CacheEntry, CacheStorage, CachedData};
use super::{CacheError, Response};

/// Marker file recording when a store was created, used for ordering
const CREATED_FILE: &str = ".created";

/// Suffix source for temp files, unique per write within the process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    key: String,
    #[serde(flatten)]
    cached: CachedData<Response>,
}

pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_path(&self, name: &str) -> Result<PathBuf, CacheError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(CacheError::Storage(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cache name: {}", name),
            )));
        }
        Ok(self.root.join(name))
    }

    fn entry_file(key: &str) -> String {
        format!("{:x}.json", Sha256::digest(key.as_bytes()))
    }

    async fn read_entry(path: &Path) -> Result<Option<DiskEntry>, CacheError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheError> {
        let path = self.store_path(name)?;
        fs::create_dir_all(&path).await?;
        let marker = path.join(CREATED_FILE);
        if fs::metadata(&marker).await.is_err() {
            let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            fs::write(&marker, nanos.to_string()).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut stores = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let created = fs::read_to_string(entry.path().join(CREATED_FILE))
                .await
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or_default();
            stores.push((created, name));
        }
        stores.sort();
        Ok(stores.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let path = self.store_path(name)?;
        match fs::remove_dir_all(&path).await {
            Ok(()) => {
                debug!(cache = name, "Deleted cache store");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, name: &str, key: &str, response: &Response) -> Result<(), CacheError> {
        self.open(name).await?;
        let path = self.store_path(name)?.join(Self::entry_file(key));
        let entry = DiskEntry {
            key: key.to_string(),
            cached: CachedData::new(response.clone()),
        };
        let contents = serde_json::to_string(&entry)?;

        // Write then rename so readers never see a partial file. Concurrent
        // writers of one key each get their own temp file; the last rename wins.
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("tmp-{}-{}", std::process::id(), n));
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn match_key(&self, key: &str) -> Result<Option<Response>, CacheError> {
        let file = Self::entry_file(key);
        for name in self.keys().await? {
            let path = self.store_path(&name)?.join(&file);
            if let Some(entry) = Self::read_entry(&path).await? {
                if entry.key == key {
                    return Ok(Some(entry.cached.data));
                }
            }
        }
        Ok(None)
    }

    async fn entries(&self, name: &str) -> Result<Vec<CacheEntry>, CacheError> {
        let path = self.store_path(name)?;
        let mut dir = match fs::read_dir(&path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(file) = dir.next_entry().await? {
            let file_path = file.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(entry) = Self::read_entry(&file_path).await? {
                entries.push(CacheEntry {
                    key: entry.key,
                    cached: entry.cached,
                });
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

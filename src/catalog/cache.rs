use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::common::constants::{CACHE_FILE_NAME, CACHE_TTL_MS};
use crate::config::app_data_dir;

/// On-disk shape of the cache file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachePayload {
    fetched_at: i64,
    fonts: Vec<Value>,
}

/// TTL-bound snapshot of the raw catalog records.
///
/// Every failure is swallowed: a broken cache only ever means "go to the network".
#[derive(Debug, Clone)]
pub struct CatalogCache {
    path: PathBuf,
    ttl_ms: i64,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl_ms: CACHE_TTL_MS,
        }
    }

    /// `<data dir>/webfont-dl/cache.json`
    pub fn default_location() -> Self {
        Self::new(app_data_dir().join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Option<Vec<Value>> {
        self.read_at(now_ms())
    }

    /// Reads the cached records as of `now` (epoch millis).
    pub fn read_at(&self, now: i64) -> Option<Vec<Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No usable cache at {}: {}", self.path.display(), e);
                return None;
            }
        };
        let payload: CachePayload = match serde_json::from_str(&content) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Ignoring malformed cache {}: {}", self.path.display(), e);
                return None;
            }
        };
        let age = now - payload.fetched_at;
        if age > self.ttl_ms {
            debug!("Cache is stale ({} ms old)", age);
            return None;
        }
        Some(payload.fonts)
    }

    pub fn write(&self, records: &[Value]) {
        self.write_at(records, now_ms())
    }

    /// Overwrites the cache with `records` stamped at `now`.
    pub fn write_at(&self, records: &[Value], now: i64) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                debug!("Could not create cache dir {}: {}", parent.display(), e);
            }
        }
        let payload = CachePayload {
            fetched_at: now,
            fonts: records.to_vec(),
        };
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not serialize catalog cache: {}", e);
                return;
            }
        };
        match std::fs::write(&self.path, body) {
            Ok(()) => debug!("Wrote {} records to {}", records.len(), self.path.display()),
            Err(e) => warn!("Could not write cache {}: {}", self.path.display(), e),
        }
    }

    /// Removes the cache file; a missing file is not an error.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove cache {}: {}", self.path.display(), e);
            }
        }
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

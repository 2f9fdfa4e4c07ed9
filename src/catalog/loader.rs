use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::app::ports::HttpClientPort;
use crate::catalog::cache::CatalogCache;
use crate::catalog::entry::FontEntry;
use crate::catalog::search::CatalogView;
use crate::common::constants::{CATALOG_URL, DETAIL_BASE_URL};
use crate::common::error::CatalogError;
use crate::common::types::LoadOutcome;
use crate::observability::metrics;

type LoadResult = Result<LoadOutcome, CatalogError>;
type InFlight = Shared<BoxFuture<'static, LoadResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
}

/// Loads the catalog from cache or network into memory.
///
/// Concurrent `load` calls made while a load is outstanding all await that
/// same load and observe its single outcome.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<Inner>,
}

struct Inner {
    http: Arc<dyn HttpClientPort>,
    cache: CatalogCache,
    catalog_url: String,
    detail_base_url: String,
    entries: RwLock<Vec<Arc<FontEntry>>>,
    in_flight: Mutex<Option<InFlight>>,
}

impl CatalogLoader {
    pub fn new(http: Arc<dyn HttpClientPort>, cache: CatalogCache) -> Self {
        Self::with_endpoints(http, cache, CATALOG_URL, DETAIL_BASE_URL)
    }

    pub fn with_endpoints(
        http: Arc<dyn HttpClientPort>,
        cache: CatalogCache,
        catalog_url: &str,
        detail_base_url: &str,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                cache,
                catalog_url: catalog_url.to_string(),
                detail_base_url: detail_base_url.to_string(),
                entries: RwLock::new(Vec::new()),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> LoaderState {
        match *self.inner.lock_in_flight() {
            Some(_) => LoaderState::Loading,
            None => LoaderState::Idle,
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.inner.cache
    }

    pub async fn load(&self, force_refresh: bool) -> LoadResult {
        let pending = {
            let mut slot = self.inner.lock_in_flight();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("Joining catalog load already in flight");
                    pending.clone()
                }
                None => {
                    let inner = self.inner.clone();
                    let pending = async move {
                        let result = inner.run_load(force_refresh).await;
                        *inner.lock_in_flight() = None;
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Replaces the in-memory catalog with entries built from `records`.
    pub fn populate(&self, records: &[Value]) {
        self.inner.populate(records)
    }

    /// Unfiltered snapshot of the current catalog.
    pub fn view(&self) -> CatalogView {
        CatalogView::new(self.inner.read_entries().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read_entries().is_empty()
    }
}

impl Inner {
    #[instrument(skip(self), fields(url = %self.catalog_url))]
    async fn run_load(&self, force_refresh: bool) -> LoadResult {
        if !force_refresh {
            if let Some(records) = self.cache.read() {
                info!("Loaded {} catalog records from cache", records.len());
                metrics::catalog::cache_hit();
                self.populate(&records);
                return Ok(LoadOutcome { from_cache: true });
            }
        }

        match self.fetch_records().await {
            Ok(records) => {
                info!("Fetched {} catalog records", records.len());
                metrics::catalog::network_load();
                self.cache.write(&records);
                self.populate(&records);
                Ok(LoadOutcome { from_cache: false })
            }
            Err(e) => {
                warn!("Catalog load failed: {}", e);
                metrics::catalog::load_error();
                self.populate(&[]);
                Err(e)
            }
        }
    }

    async fn fetch_records(&self) -> Result<Vec<Value>, CatalogError> {
        let resp = self.http.get(&self.catalog_url).await?;
        match serde_json::from_str::<Value>(&resp.text) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(CatalogError::InvalidFormat("expected a JSON array of fonts".to_string())),
            Err(e) => Err(CatalogError::InvalidFormat(e.to_string())),
        }
    }

    fn populate(&self, records: &[Value]) {
        let entries: Vec<Arc<FontEntry>> = records
            .iter()
            .map(|raw| Arc::new(FontEntry::from_raw_with_base(raw, &self.detail_base_url)))
            .collect();
        metrics::catalog::entries(entries.len());
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<FontEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

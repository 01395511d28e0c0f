//! In-memory scenario cache.
//!
//! Lifecycle: empty → filled once under the refill lock → read many. There
//! is no TTL and no invalidation; a generation lives until the process exits.
//! A failed or invalid fetch leaves the cache empty so the next caller tries
//! again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{ArkhamError, ArkhamResult};
use crate::fetcher::Fetcher;
use crate::models::ScenarioRecord;

/// One validated batch of scenarios.
#[derive(Debug, Clone)]
struct Generation {
    records: Arc<Vec<ScenarioRecord>>,
    fetched_at: DateTime<Utc>,
}

/// Snapshot of the cache for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub populated: bool,
    pub records: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

pub struct ScenarioCache {
    fetcher: Arc<dyn Fetcher>,
    current: RwLock<Option<Generation>>,
    /// Held for the whole fetch-and-validate sequence; at most one refill in flight.
    refill: Mutex<()>,
}

impl ScenarioCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            current: RwLock::new(None),
            refill: Mutex::new(()),
        }
    }

    /// Cached scenarios, fetching them first if the cache is empty.
    ///
    /// Never fails: fetch and validation errors are logged and yield an
    /// empty list.
    pub async fn get_scenarios(&self) -> Arc<Vec<ScenarioRecord>> {
        if let Some(records) = self.cached().await {
            debug!(count = records.len(), "scenario cache hit");
            return records;
        }

        let _guard = self.refill.lock().await;

        // Another caller may have filled it while we waited.
        if let Some(records) = self.cached().await {
            return records;
        }

        match self.fetch_validated().await {
            Ok(records) if records.is_empty() => {
                warn!("scenario fetch returned no records");
                Arc::new(Vec::new())
            }
            Ok(records) => {
                let records = Arc::new(records);
                let fetched_at = Utc::now();
                info!(count = records.len(), %fetched_at, "scenario cache filled");
                *self.current.write().await = Some(Generation {
                    records: records.clone(),
                    fetched_at,
                });
                records
            }
            Err(e) => {
                warn!(error = %e, "scenario fetch failed; serving empty list");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn status(&self) -> CacheStatus {
        match self.current.read().await.as_ref() {
            Some(generation) => CacheStatus {
                populated: true,
                records: generation.records.len(),
                fetched_at: Some(generation.fetched_at),
            },
            None => CacheStatus {
                populated: false,
                records: 0,
                fetched_at: None,
            },
        }
    }

    async fn cached(&self) -> Option<Arc<Vec<ScenarioRecord>>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|g| !g.records.is_empty())
            .map(|g| g.records.clone())
    }

    async fn fetch_validated(&self) -> ArkhamResult<Vec<ScenarioRecord>> {
        let records = self.fetcher.fetch_scenarios().await?;
        validate_batch(&records)?;
        Ok(records)
    }
}

/// All-or-nothing: one record missing `id`, `title` or `url` voids the batch.
pub fn validate_batch(records: &[ScenarioRecord]) -> ArkhamResult<()> {
    for (index, record) in records.iter().enumerate() {
        let missing = [
            ("id", &record.id),
            ("title", &record.title),
            ("url", &record.url),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(ArkhamError::Validation(format!(
                "scenario #{} has an empty {}",
                index, field
            )));
        }
    }
    Ok(())
}

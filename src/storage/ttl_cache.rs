use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::ProductInfo;
use crate::errors::{TrackerError, TrackerResult};
use crate::storage::traits::ResultCache;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ProductInfo,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// In-memory scrape cache. Expired entries are dropped when looked up,
/// never by a background sweep.
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl TtlCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn entries(&self) -> TrackerResult<MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| TrackerError::Cache("cache lock poisoned".to_string()))
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResultCache for TtlCache {
    fn get(&self, key: &str) -> TrackerResult<Option<ProductInfo>> {
        let mut entries = self.entries()?;

        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };

        if entry.is_fresh(Instant::now()) {
            return Ok(Some(entry.value.clone()));
        }

        entries.remove(key);
        Ok(None)
    }

    fn set(&self, key: &str, value: ProductInfo, ttl: Option<Duration>) -> TrackerResult<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };

        self.entries()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn clear(&self) -> TrackerResult<()> {
        self.entries()?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

use std::time::Duration;

use crate::domain::ProductInfo;
use crate::errors::TrackerResult;

#[cfg_attr(test, mockall::automock)]
pub trait ResultCache: Send + Sync {
    /// Cached value for `key`, or `None` when absent or expired
    fn get(&self, key: &str) -> TrackerResult<Option<ProductInfo>>;
    /// Insert or overwrite; `ttl = None` uses the cache's default TTL
    fn set(&self, key: &str, value: ProductInfo, ttl: Option<Duration>) -> TrackerResult<()>;
    fn clear(&self) -> TrackerResult<()>;
    /// Stored entries, including expired ones not yet looked up
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn default_ttl(&self) -> Duration;
}

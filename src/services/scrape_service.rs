use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::domain::product::UNKNOWN_RETAILER;
use crate::domain::{ProductInfo, ProductResult};
use crate::errors::TrackerResult;
use crate::retailers::RetailerRegistry;
use crate::services::retry::{fetch_and_extract, DEFAULT_BACKOFF_BASE};
use crate::storage::{ResultCache, TtlCache};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub enabled: bool,
    pub size: usize,
    pub default_ttl: Option<Duration>,
}

/// Routes product URLs to their retailer, consulting the cache first
pub struct ScrapeService<C: ResultCache> {
    registry: RetailerRegistry,
    cache: Option<C>,
    backoff_base: Duration,
}

impl ScrapeService<TtlCache> {
    pub fn from_config(config: &Config) -> TrackerResult<Self> {
        let registry = RetailerRegistry::from_config(config)?;
        let cache = config
            .scraping
            .enable_cache
            .then(|| TtlCache::new(config.scraping.cache_ttl()));

        Ok(Self::new(registry, cache))
    }
}

impl<C: ResultCache> ScrapeService<C> {
    pub fn new(registry: RetailerRegistry, cache: Option<C>) -> Self {
        Self {
            registry,
            cache,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn registry(&self) -> &RetailerRegistry {
        &self.registry
    }

    /// Scrape one product page.
    /// Errors only come from the cache; scrape failures are sentinel values.
    pub fn scrape_product(&self, url: &str, use_cache: bool) -> TrackerResult<ProductInfo> {
        let Some(retailer) = self.registry.get_retailer_for_url(url) else {
            tracing::warn!("No retailer found for URL: {}", url);
            return Ok(ProductInfo::unsupported_retailer());
        };

        let cache = self.cache.as_ref().filter(|_| use_cache);
        let key = retailer.cache_key(url);

        if let Some(cache) = cache {
            if let Some(hit) = cache.get(&key)? {
                tracing::debug!("Cache hit for {}", key);
                return Ok(hit);
            }
        }

        let info = fetch_and_extract(retailer, url, self.backoff_base);

        if let Some(cache) = cache {
            if info.is_found() {
                cache.set(&key, info.clone(), retailer.settings().cache_ttl)?;
            }
        }

        Ok(info)
    }

    /// Scrape every URL in order, pausing between requests.
    ///
    /// A zero `delay` disables pacing; otherwise the pause before each URL
    /// after the first is the larger of `delay` and that retailer's own
    /// rate limit. One URL failing never affects the others.
    pub fn scrape_multiple(
        &self,
        urls: &[String],
        use_cache: bool,
        delay: Duration,
    ) -> Vec<ProductResult> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let retailer = self.registry.get_retailer_for_url(url);

            if i > 0 && !delay.is_zero() {
                let pause = retailer
                    .map(|r| r.settings().rate_limit_delay.max(delay))
                    .unwrap_or(delay);
                std::thread::sleep(pause);
            }

            tracing::info!("Scraping {}/{}: {}", i + 1, urls.len(), url);

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.scrape_product(url, use_cache)
            }));

            let result = match outcome {
                Ok(Ok(info)) => {
                    let name = retailer.map(|r| r.name()).unwrap_or(UNKNOWN_RETAILER);
                    ProductResult::new(url, name, info)
                }
                Ok(Err(e)) => {
                    tracing::error!("Failed to scrape {}: {}", url, e);
                    ProductResult::failed(url, &e.to_string())
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!("Scraping {} panicked: {}", url, message);
                    ProductResult::failed(url, &message)
                }
            };

            results.push(result);
        }

        let successful = results.iter().filter(|r| r.success()).count();
        tracing::info!(
            "Batch complete: {} successful, {} failed in {:.1}s",
            successful,
            results.len() - successful,
            started.elapsed().as_secs_f64()
        );

        results
    }

    pub fn cache_stats(&self) -> CacheStats {
        match &self.cache {
            Some(cache) => CacheStats {
                enabled: true,
                size: cache.len(),
                default_ttl: Some(cache.default_ttl()),
            },
            None => CacheStats {
                enabled: false,
                size: 0,
                default_ttl: None,
            },
        }
    }

    pub fn clear_cache(&self) -> TrackerResult<()> {
        match &self.cache {
            Some(cache) => {
                cache.clear()?;
                tracing::info!("Cache cleared");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

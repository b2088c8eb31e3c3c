//! Bounded retry around one fetch + extract round trip.
//!
//! Only transport failures are retried. Once a page has been downloaded,
//! whatever the strategy makes of it is final: a broken page layout does not
//! fix itself between attempts.

use std::time::Duration;

use scraper::Html;

use crate::domain::ProductInfo;
use crate::retailers::RetailerStrategy;

/// Wait before the first retry; doubles on every further attempt
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Sleep before retrying after the zero-based `attempt` failed
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Fetch `url` with the strategy's session and extract the product.
///
/// Never fails: an unsupported URL, exhausted retries and extraction
/// errors all come back as sentinel values.
pub fn fetch_and_extract(
    strategy: &dyn RetailerStrategy,
    url: &str,
    backoff_base: Duration,
) -> ProductInfo {
    if !strategy.is_supported(url) {
        tracing::warn!("{} does not support {}", strategy.name(), url);
        return ProductInfo::unsupported_url();
    }

    let attempts = strategy.settings().retry_attempts.max(1);

    for attempt in 0..attempts {
        let body = match strategy.fetcher().get(url) {
            Ok(body) => body,
            Err(e) if e.is_transient() && attempt + 1 < attempts => {
                let wait = backoff_delay(backoff_base, attempt);
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                    attempt + 1,
                    attempts,
                    url,
                    e,
                    wait
                );
                std::thread::sleep(wait);
                continue;
            }
            Err(e) => {
                tracing::error!(
                    "Giving up on {} after {} attempt(s): {}",
                    url,
                    attempt + 1,
                    e
                );
                return ProductInfo::not_found();
            }
        };

        let document = Html::parse_document(&body);

        return match strategy.extract(&document, url) {
            Ok(info) => {
                tracing::info!(
                    "Scraped {} product: {} - {}",
                    strategy.name(),
                    info.name,
                    info.price
                );
                info
            }
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", url, e);
                ProductInfo::not_found()
            }
        };
    }

    ProductInfo::not_found()
}

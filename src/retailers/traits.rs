use std::time::Duration;

use scraper::Html;

use crate::config::RetailerSettings;
use crate::domain::ProductInfo;
use crate::errors::TrackerResult;
use crate::services::Fetcher;

#[derive(Debug, Clone, PartialEq)]
pub struct RetailerMetadata {
    pub name: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
}

pub trait RetailerStrategy: Send + Sync {
    /// Unique registry key, also used as the `retailer` tag on results
    fn name(&self) -> &str;

    /// Per-instance scraping configuration
    fn settings(&self) -> &RetailerSettings;

    /// Check if this retailer can handle the given URL
    fn is_supported(&self, url: &str) -> bool;

    /// Extract (name, price, image) from a parsed product page.
    /// Missing markup yields sentinels; an `Err` is treated as a permanent failure.
    fn extract(&self, document: &Html, url: &str) -> TrackerResult<ProductInfo>;

    /// HTTP session used to download product pages
    fn fetcher(&self) -> &dyn Fetcher;

    fn cache_key(&self, url: &str) -> String {
        format!("{}:{}", self.name(), url)
    }

    fn metadata(&self) -> RetailerMetadata {
        let settings = self.settings();

        RetailerMetadata {
            name: self.name().to_string(),
            user_agent: settings.user_agent.clone(),
            timeout: settings.timeout,
            retry_attempts: settings.retry_attempts,
        }
    }
}

pub mod fetch_service;
pub mod retry;
pub mod scrape_service;

pub use fetch_service::{Fetcher, HttpFetcher};
pub use retry::fetch_and_extract;
pub use scrape_service::{CacheStats, ScrapeService};

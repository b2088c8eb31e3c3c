use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{TrackerError, TrackerResult};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Global scraping defaults, used for any retailer without its own override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub rate_limit_delay_secs: f64,
    pub enable_cache: bool,
    pub cache_ttl_secs: u64,
}

impl Default for ScrapingSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            retry_attempts: 3,
            rate_limit_delay_secs: 1.5,
            enable_cache: true,
            cache_ttl_secs: 3600,
        }
    }
}

impl ScrapingSettings {
    pub fn rate_limit_delay(&self) -> TrackerResult<Duration> {
        secs_to_duration("default", self.rate_limit_delay_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Per-retailer overrides as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetailerOverrides {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub rate_limit_delay_secs: Option<f64>,
    pub cache_ttl_secs: Option<u64>,
    pub name_selectors: Vec<String>,
    pub price_selectors: Vec<String>,
}

/// Resolved settings attached to one retailer strategy instance
#[derive(Debug, Clone, PartialEq)]
pub struct RetailerSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub rate_limit_delay: Duration,
    /// `None` means the cache's default TTL applies
    pub cache_ttl: Option<Duration>,
    /// Empty lists mean the strategy's built-in selectors apply
    pub name_selectors: Vec<String>,
    pub price_selectors: Vec<String>,
}

impl Default for RetailerSettings {
    fn default() -> Self {
        let defaults = ScrapingSettings::default();

        Self {
            user_agent: defaults.user_agent,
            timeout: Duration::from_secs(defaults.timeout_secs),
            retry_attempts: defaults.retry_attempts,
            rate_limit_delay: Duration::from_secs_f64(defaults.rate_limit_delay_secs),
            cache_ttl: None,
            name_selectors: Vec::new(),
            price_selectors: Vec::new(),
        }
    }
}

impl RetailerSettings {
    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Option<Duration>) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_rate_limit_delay(mut self, rate_limit_delay: Duration) -> Self {
        self.rate_limit_delay = rate_limit_delay;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product URLs to track, grouped by retailer name
    pub products: BTreeMap<String, Vec<String>>,
    pub scraping: ScrapingSettings,
    pub retailers: BTreeMap<String, RetailerOverrides>,
}

impl Default for Config {
    fn default() -> Self {
        let mut retailers = BTreeMap::new();
        retailers.insert(
            "lululemon".to_string(),
            RetailerOverrides {
                user_agent: Some(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                        .to_string(),
                ),
                timeout_secs: Some(15),
                retry_attempts: Some(3),
                rate_limit_delay_secs: Some(2.0),
                cache_ttl_secs: Some(1800),
                ..Default::default()
            },
        );
        retailers.insert(
            "nike".to_string(),
            RetailerOverrides {
                user_agent: Some(
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
                ),
                timeout_secs: Some(20),
                retry_attempts: Some(4),
                rate_limit_delay_secs: Some(1.5),
                cache_ttl_secs: Some(1800),
                ..Default::default()
            },
        );

        Self {
            products: BTreeMap::new(),
            scraping: ScrapingSettings::default(),
            retailers,
        }
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// [`Config::load`] followed by [`Config::validate`]
    pub fn from_env() -> TrackerResult<Self> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env`, then the JSON config file, then environment overrides
    pub fn load() -> TrackerResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default config path is relative to executable directory
        let path = std::env::var("SALE_TRACKER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                exe_dir
                    .map(|d| d.join("sale_tracker.json"))
                    .unwrap_or_else(|| PathBuf::from("./sale_tracker.json"))
            });

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> TrackerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> TrackerResult<Self> {
        serde_json::from_str(content).map_err(|e| TrackerError::Config(e.to_string()))
    }

    fn apply_env_overrides(&mut self) -> TrackerResult<()> {
        if let Ok(user_agent) = std::env::var("SALE_TRACKER_USER_AGENT") {
            self.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = env_parse("SALE_TRACKER_TIMEOUT")? {
            self.scraping.timeout_secs = timeout;
        }
        if let Some(attempts) = env_parse("SALE_TRACKER_RETRY_ATTEMPTS")? {
            self.scraping.retry_attempts = attempts;
        }
        if let Some(delay) = env_parse("SALE_TRACKER_RATE_LIMIT_DELAY")? {
            self.scraping.rate_limit_delay_secs = delay;
        }
        if let Some(ttl) = env_parse("SALE_TRACKER_CACHE_TTL")? {
            self.scraping.cache_ttl_secs = ttl;
        }
        if let Some(enabled) = env_parse("SALE_TRACKER_ENABLE_CACHE")? {
            self.scraping.enable_cache = enabled;
        }
        Ok(())
    }

    /// Merge a retailer's overrides over the global scraping defaults
    pub fn retailer_settings(&self, retailer: &str) -> TrackerResult<RetailerSettings> {
        let overrides = self.retailers.get(retailer).cloned().unwrap_or_default();
        let global = &self.scraping;

        let delay_secs = overrides
            .rate_limit_delay_secs
            .unwrap_or(global.rate_limit_delay_secs);

        Ok(RetailerSettings {
            user_agent: overrides
                .user_agent
                .unwrap_or_else(|| global.user_agent.clone()),
            timeout: Duration::from_secs(overrides.timeout_secs.unwrap_or(global.timeout_secs)),
            retry_attempts: overrides.retry_attempts.unwrap_or(global.retry_attempts),
            rate_limit_delay: secs_to_duration(retailer, delay_secs)?,
            cache_ttl: overrides.cache_ttl_secs.map(Duration::from_secs),
            name_selectors: overrides.name_selectors,
            price_selectors: overrides.price_selectors,
        })
    }

    /// Reject settings that would make the scraper misbehave
    pub fn validate(&self) -> TrackerResult<()> {
        self.scraping.rate_limit_delay()?;

        let names = std::iter::once("default").chain(self.retailers.keys().map(String::as_str));
        for name in names {
            let settings = self.retailer_settings(name)?;
            if settings.retry_attempts < 1 {
                return Err(TrackerError::Config(format!(
                    "retry_attempts for {} must be at least 1",
                    name
                )));
            }
            if settings.timeout.is_zero() {
                return Err(TrackerError::Config(format!(
                    "timeout_secs for {} must be positive",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Non-fatal configuration problems worth reporting
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Err(e) = self.validate() {
            issues.push(e.to_string());
        }

        if self.product_urls().is_empty() {
            issues.push("No product links configured".to_string());
        }

        if self.scraping.timeout_secs < 5 {
            issues.push("Scraping timeout too low (minimum 5 seconds recommended)".to_string());
        }

        issues
    }

    /// All configured product URLs, grouped by retailer name order
    pub fn product_urls(&self) -> Vec<String> {
        self.products.values().flatten().cloned().collect()
    }
}

fn secs_to_duration(retailer: &str, secs: f64) -> TrackerResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        TrackerError::Config(format!(
            "rate limit delay for {} must be a non-negative number of seconds, got {}",
            retailer, secs
        ))
    })
}

fn env_parse<T: FromStr>(key: &str) -> TrackerResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TrackerError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retailer_overrides_fall_back_to_global() {
        let config = Config::default();

        let nike = config.retailer_settings("nike").unwrap();
        assert_eq!(nike.timeout, Duration::from_secs(20));
        assert_eq!(nike.retry_attempts, 4);
        assert_eq!(nike.cache_ttl, Some(Duration::from_secs(1800)));

        let unknown = config.retailer_settings("unknown").unwrap();
        assert_eq!(unknown.timeout, Duration::from_secs(config.scraping.timeout_secs));
        assert_eq!(unknown.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(unknown.cache_ttl, None);
    }

    #[test]
    fn test_from_json_partial_file() {
        let config = Config::from_json(
            r#"{
                "products": {"nike": ["https://www.nike.com/t/jacket"]},
                "scraping": {"timeout_secs": 30},
                "retailers": {"nike": {"price_selectors": [".sale-price"]}}
            }"#,
        )
        .unwrap();

        assert_eq!(config.scraping.timeout_secs, 30);
        assert_eq!(config.scraping.retry_attempts, 3);
        assert_eq!(config.product_urls(), vec!["https://www.nike.com/t/jacket"]);

        let nike = config.retailer_settings("nike").unwrap();
        assert_eq!(nike.price_selectors, vec![".sale-price".to_string()]);
        assert_eq!(nike.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_retry_attempts() {
        let mut config = Config::default();
        config.retailers.get_mut("nike").unwrap().retry_attempts = Some(0);

        assert!(matches!(config.validate(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_negative_delay() {
        let mut config = Config::default();
        config.scraping.rate_limit_delay_secs = -1.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_issues_reports_missing_products() {
        let issues = Config::default().issues();
        assert!(issues.iter().any(|i| i == "No product links configured"));
    }

    #[test]
    fn test_issues_include_validation_error() {
        let config = Config::from_json(r#"{"scraping": {"retry_attempts": 0}}"#).unwrap();

        let issues = config.issues();
        assert!(issues
            .iter()
            .any(|i| i.contains("retry_attempts for default must be at least 1")));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            Config::from_json("{not json"),
            Err(TrackerError::Config(_))
        ));
    }
}

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const NAME_NOT_FOUND: &str = "Product name not found";
pub const PRICE_NOT_FOUND: &str = "Price not found";
pub const UNSUPPORTED_URL: &str = "Unsupported URL";
pub const UNSUPPORTED_RETAILER: &str = "Unsupported retailer";
pub const UNKNOWN_RETAILER: &str = "unknown";

/// Names that mark a failed scrape rather than a real product title
const FAILURE_NAMES: &[&str] = &[NAME_NOT_FOUND, UNSUPPORTED_URL, UNSUPPORTED_RETAILER];

/// The (name, price, image) triple produced by a retailer strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub price: String,
    pub image: String,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, price: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            image: image.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(NAME_NOT_FOUND, PRICE_NOT_FOUND, "")
    }

    pub fn unsupported_url() -> Self {
        Self::new(UNSUPPORTED_URL, PRICE_NOT_FOUND, "")
    }

    pub fn unsupported_retailer() -> Self {
        Self::new(UNSUPPORTED_RETAILER, PRICE_NOT_FOUND, "")
    }

    /// True when the name is a real product title and not a sentinel or error
    pub fn is_found(&self) -> bool {
        !FAILURE_NAMES.contains(&self.name.as_str()) && !self.name.starts_with("Error:")
    }
}

/// One row of a batch scrape. Built only through the constructors so that
/// `success` always agrees with `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductResult {
    pub url: String,
    pub retailer: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub timestamp: String,
    success: bool,
}

impl ProductResult {
    pub fn new(url: &str, retailer: &str, info: ProductInfo) -> Self {
        let success = info.is_found();

        Self {
            url: url.to_string(),
            retailer: retailer.to_string(),
            name: info.name,
            price: info.price,
            image: info.image,
            timestamp: now_iso8601(),
            success,
        }
    }

    /// Result for a URL whose processing failed unexpectedly
    pub fn failed(url: &str, message: &str) -> Self {
        Self::new(
            url,
            UNKNOWN_RETAILER,
            ProductInfo::new(format!("Error: {}", message), "N/A", ""),
        )
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn info(&self) -> ProductInfo {
        ProductInfo::new(self.name.clone(), self.price.clone(), self.image.clone())
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_not_found() {
        assert!(!ProductInfo::not_found().is_found());
        assert!(!ProductInfo::unsupported_url().is_found());
        assert!(!ProductInfo::unsupported_retailer().is_found());
        assert!(ProductInfo::new("Pace Breaker Jacket", "$148USD", "").is_found());
    }

    #[test]
    fn test_success_is_derived_from_name() {
        let ok = ProductResult::new(
            "https://shop.lululemon.com/p/x",
            "lululemon",
            ProductInfo::new("Down For It All Hoodie", "$128USD", "https://img/x.jpg"),
        );
        assert!(ok.success());
        assert_eq!(ok.retailer, "lululemon");

        let missing = ProductResult::new(
            "https://shop.lululemon.com/p/x",
            "lululemon",
            ProductInfo::not_found(),
        );
        assert!(!missing.success());
        assert_eq!(missing.price, PRICE_NOT_FOUND);
    }

    #[test]
    fn test_failed_result_carries_message() {
        let result = ProductResult::failed("https://www.nike.com/t/x", "cache lock poisoned");

        assert!(!result.success());
        assert_eq!(result.name, "Error: cache lock poisoned");
        assert_eq!(result.retailer, UNKNOWN_RETAILER);
        assert_eq!(result.image, "");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let result = ProductResult::new("u", "nike", ProductInfo::not_found());
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }

    #[test]
    fn test_serializes_every_field() {
        let result = ProductResult::new("u", "nike", ProductInfo::new("Shoe", "$90USD", ""));
        let json = serde_json::to_value(&result).unwrap();

        for field in ["url", "retailer", "name", "price", "image", "timestamp", "success"] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["success"], true);
    }
}

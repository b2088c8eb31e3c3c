use scraper::Html;

use crate::config::RetailerSettings;
use crate::domain::ProductInfo;
use crate::errors::TrackerResult;
use crate::retailers::extract::{self, SelectorChains, StructuredProduct};
use crate::retailers::traits::RetailerStrategy;
use crate::services::{Fetcher, HttpFetcher};

const NAME_SELECTORS: &[&str] = &[
    r#"h1[data-testid="pdp-product-name"]"#,
    "h1.pdp-product-name",
    "h1",
    r#"[data-testid="product-name"]"#,
];

const PRICE_SELECTORS: &[&str] = &[
    r#"[data-testid="product-price"]"#,
    ".price",
    ".product-price",
    r#"[class*="price"]"#,
];

const IMAGE_SELECTORS: &[&str] = &[
    r#"img[data-testid="product-image"]"#,
    ".product-image img",
    r#"img[alt*="product"]"#,
    r#"img[alt*="Product"]"#,
];

pub struct LululemonRetailer {
    settings: RetailerSettings,
    selectors: SelectorChains,
    fetcher: Box<dyn Fetcher>,
}

impl LululemonRetailer {
    pub const NAME: &'static str = "lululemon";

    pub fn new(settings: RetailerSettings) -> TrackerResult<Self> {
        let fetcher = HttpFetcher::new(&settings)?;
        Ok(Self::with_fetcher(settings, Box::new(fetcher)))
    }

    pub fn with_fetcher(settings: RetailerSettings, fetcher: Box<dyn Fetcher>) -> Self {
        let selectors = SelectorChains::new(
            &settings.name_selectors,
            &settings.price_selectors,
            NAME_SELECTORS,
            PRICE_SELECTORS,
            IMAGE_SELECTORS,
        );

        Self {
            settings,
            selectors,
            fetcher,
        }
    }

    /// First `Product` block (or untyped block) that names a product or a price
    fn structured_data(document: &Html) -> StructuredProduct {
        extract::json_ld_blocks(document)
            .iter()
            .filter(|block| extract::is_product_type(block) || !extract::has_type(block))
            .map(extract::structured_product)
            .find(|product| !product.is_empty())
            .unwrap_or_default()
    }

    /// Anything that mentions an amount counts as a price
    fn is_price_text(text: &str) -> bool {
        text.chars().any(|c| c.is_ascii_digit())
    }
}

impl RetailerStrategy for LululemonRetailer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn settings(&self) -> &RetailerSettings {
        &self.settings
    }

    fn is_supported(&self, url: &str) -> bool {
        url.contains("shop.lululemon.com")
    }

    fn extract(&self, document: &Html, url: &str) -> TrackerResult<ProductInfo> {
        let structured = Self::structured_data(document);

        Ok(extract::resolve_product(
            document,
            url,
            structured,
            &self.selectors,
            Self::is_price_text,
        ))
    }

    fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }
}

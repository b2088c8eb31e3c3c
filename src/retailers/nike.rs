use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::config::RetailerSettings;
use crate::domain::ProductInfo;
use crate::errors::TrackerResult;
use crate::retailers::extract::{self, SelectorChains, StructuredProduct};
use crate::retailers::traits::RetailerStrategy;
use crate::services::{Fetcher, HttpFetcher};

const NAME_SELECTORS: &[&str] = &[
    "h1#pdp_product_title",
    r#"h1[data-test="product-title"]"#,
    "h1.pdp-product-title",
    "h1",
    r#"[data-test="product-title"]"#,
];

const PRICE_SELECTORS: &[&str] = &[
    r#"[data-test="product-price"]"#,
    ".product-price",
    ".price-current",
    r#"[class*="price"]"#,
    ".notranslate",
];

const IMAGE_SELECTORS: &[&str] = &[
    r#"img[data-test="product-image"]"#,
    ".product-image img",
    r#"img[alt*="product"]"#,
    r#"img[alt*="Product"]"#,
];

// `.notranslate` also matches sizes and colorways
static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$€£]|USD").expect("valid currency regex"));

pub struct NikeRetailer {
    settings: RetailerSettings,
    selectors: SelectorChains,
    fetcher: Box<dyn Fetcher>,
}

impl NikeRetailer {
    pub const NAME: &'static str = "nike";

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

    fn structured_data(document: &Html) -> StructuredProduct {
        extract::json_ld_blocks(document)
            .iter()
            .map(extract::structured_product)
            .find(|product| !product.is_empty())
            .unwrap_or_default()
    }

    fn is_price_text(text: &str) -> bool {
        CURRENCY.is_match(text)
    }
}

impl RetailerStrategy for NikeRetailer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn settings(&self) -> &RetailerSettings {
        &self.settings
    }

    fn is_supported(&self, url: &str) -> bool {
        url.contains("nike.com")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetch_service::MockFetcher;

    const URL: &str = "https://www.nike.com/t/air-force-1-07-mens-shoes-jBrhbr/CW2288-111";

    fn retailer() -> NikeRetailer {
        NikeRetailer::with_fetcher(RetailerSettings::default(), Box::new(MockFetcher::new()))
    }

    fn extract(html: &str) -> ProductInfo {
        retailer().extract(&Html::parse_document(html), URL).unwrap()
    }

    #[test]
    fn test_is_supported() {
        let retailer = retailer();

        assert!(retailer.is_supported(URL));
        assert!(retailer.is_supported("https://nike.com/t/pegasus-41"));
        assert!(!retailer.is_supported("https://shop.lululemon.com/p/test"));
        assert!(!retailer.is_supported("https://www.adidas.com/us/samba"));
    }

    #[test]
    fn test_first_json_ld_block_regardless_of_type() {
        let info = extract(
            r#"<html><head>
            <script type="application/ld+json">{"@type":"ProductGroup","name":"Air Force 1 '07","offers":{"lowPrice":115,"priceCurrency":"USD"},"image":{"url":"https://static.nike.com/af1.png"}}</script>
            <script type="application/ld+json">{"@type":"Product","name":"Second"}</script>
            </head></html>"#,
        );

        assert_eq!(info.name, "Air Force 1 '07");
        assert_eq!(info.price, "$115USD");
        assert_eq!(info.image, "https://static.nike.com/af1.png");
    }

    #[test]
    fn test_title_and_price_from_markup() {
        let info = extract(
            r#"<html><body>
            <h1 id="pdp_product_title">Pegasus 41</h1>
            <div data-test="product-price">$140</div>
            <img data-test="product-image" src="/images/pegasus.png">
            </body></html>"#,
        );

        assert_eq!(info.name, "Pegasus 41");
        assert_eq!(info.price, "$140");
        assert_eq!(info.image, "https://www.nike.com/images/pegasus.png");
    }

    #[test]
    fn test_notranslate_without_currency_is_not_a_price() {
        let info = extract(
            r#"<html><body>
            <h1>Dunk Low</h1>
            <span class="notranslate">DD1391-100</span>
            </body></html>"#,
        );

        assert_eq!(info.name, "Dunk Low");
        assert_eq!(info.price, crate::domain::product::PRICE_NOT_FOUND);
    }

    #[test]
    fn test_notranslate_with_currency() {
        let info = extract(
            r#"<html><body>
            <h1>Dunk Low</h1>
            <span class="notranslate">DD1391-100</span>
            <span class="notranslate">€119,99</span>
            </body></html>"#,
        );

        assert_eq!(info.price, "€119,99");
    }

    #[test]
    fn test_price_with_trailing_currency_code() {
        let info = extract(
            r#"<html><body>
            <h1>Club Fleece Hoodie</h1>
            <div class="product-price">119.99USD</div>
            </body></html>"#,
        );

        assert_eq!(info.price, "119.99USD");
    }

    #[test]
    fn test_empty_page_returns_sentinels() {
        assert_eq!(extract("<html></html>"), ProductInfo::not_found());
    }
}

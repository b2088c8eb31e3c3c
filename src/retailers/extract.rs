//! Extraction building blocks shared by the retailer strategies.
//!
//! Every helper is total: malformed JSON, invalid selectors and missing
//! elements all come back as `None` so the caller can move on to the next
//! candidate source.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::domain::product::{NAME_NOT_FOUND, PRICE_NOT_FOUND};
use crate::domain::ProductInfo;

static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

const DEFAULT_CURRENCY: &str = "USD";

/// Product fields found in embedded structured data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredProduct {
    pub name: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl StructuredProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }
}

/// Ordered fallback selectors for one retailer
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorChains {
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub image: Vec<String>,
}

impl SelectorChains {
    /// Configured selectors win; empty lists keep the built-in defaults
    pub fn new(
        configured_name: &[String],
        configured_price: &[String],
        default_name: &[&str],
        default_price: &[&str],
        default_image: &[&str],
    ) -> Self {
        Self {
            name: pick(configured_name, default_name),
            price: pick(configured_price, default_price),
            image: default_image.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn pick(configured: &[String], defaults: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        configured.to_vec()
    }
}

/// Parse every JSON-LD block on the page, skipping malformed ones.
/// A list payload contributes its first element; `@graph` items are flattened.
pub fn json_ld_blocks(document: &Html) -> Vec<Value> {
    let mut blocks = Vec::new();

    for script in document.select(&JSON_LD) {
        let text = script.text().collect::<String>();
        if text.trim().is_empty() {
            continue;
        }

        let data = match serde_json::from_str::<Value>(&text) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };

        let data = match data {
            Value::Array(items) => match items.into_iter().next() {
                Some(first) => first,
                None => continue,
            },
            other => other,
        };

        if let Some(graph) = data.get("@graph").and_then(Value::as_array) {
            blocks.extend(graph.iter().cloned());
        } else {
            blocks.push(data);
        }
    }

    blocks
}

pub fn has_type(block: &Value) -> bool {
    block.get("@type").is_some()
}

pub fn is_product_type(block: &Value) -> bool {
    match block.get("@type") {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

/// Read name, formatted price and image out of one structured-data block
pub fn structured_product(block: &Value) -> StructuredProduct {
    let name = first_item(block.get("name")).and_then(scalar_string);

    let offers = first_item(block.get("offers"));
    let price = offers.and_then(|offer| {
        let value = first_item(offer.get("price"))
            .and_then(scalar_string)
            .or_else(|| first_item(offer.get("lowPrice")).and_then(scalar_string))?;

        let currency = first_item(offer.get("priceCurrency"))
            .and_then(scalar_string)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Some(format_price(&value, &currency))
    });

    let image = first_item(block.get("image")).and_then(|image| match image {
        Value::Object(obj) => obj.get("url").and_then(scalar_string),
        other => scalar_string(other),
    });

    StructuredProduct { name, price, image }
}

/// `"$" + value + currency`, no separators
pub fn format_price(value: &str, currency: &str) -> String {
    format!("${}{}", value, currency)
}

fn first_item(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Array(items) => items.first(),
        Value::Null => None,
        other => Some(other),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Skipping invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

/// `content` of `meta[property=...]` or `meta[name=...]`
pub fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = parse_selector(&format!(
        r#"meta[property="{0}"], meta[name="{0}"]"#,
        property
    ))?;

    document
        .select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty element text across the selectors, in order, that `accept` allows
pub fn first_text<F>(document: &Html, selectors: &[String], accept: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    for selector in selectors {
        let Some(parsed) = parse_selector(selector) else {
            continue;
        };

        let found = document
            .select(&parsed)
            .map(element_text)
            .find(|text| !text.is_empty() && accept(text.as_str()));

        if found.is_some() {
            return found;
        }
    }

    None
}

/// First image source across the selectors, resolved against the page URL
pub fn first_image(document: &Html, selectors: &[String], page_url: &str) -> Option<String> {
    for selector in selectors {
        let Some(parsed) = parse_selector(selector) else {
            continue;
        };

        for element in document.select(&parsed) {
            let value = element.value();
            let source = if value.name() == "meta" {
                value.attr("content")
            } else {
                value
                    .attr("src")
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| value.attr("data-src"))
            };

            if let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) {
                return Some(absolute_url(page_url, source));
            }
        }
    }

    None
}

/// Resolve `src` against `page_url`; leaves it untouched when either fails to parse
pub fn absolute_url(page_url: &str, src: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// Fill name, price and image from structured data first, then markup.
/// The image chain is independent of how name and price were found.
pub fn resolve_product<F>(
    document: &Html,
    page_url: &str,
    structured: StructuredProduct,
    chains: &SelectorChains,
    accept_price: F,
) -> ProductInfo
where
    F: Fn(&str) -> bool,
{
    let name = structured
        .name
        .or_else(|| meta_content(document, "og:title"))
        .or_else(|| first_text(document, &chains.name, |_| true))
        .unwrap_or_else(|| NAME_NOT_FOUND.to_string());

    let price = structured
        .price
        .or_else(|| first_text(document, &chains.price, accept_price))
        .unwrap_or_else(|| PRICE_NOT_FOUND.to_string());

    let image = structured
        .image
        .or_else(|| meta_content(document, "og:image"))
        .map(|src| absolute_url(page_url, &src))
        .or_else(|| first_image(document, &chains.image, page_url))
        .unwrap_or_default();

    ProductInfo { name, price, image }
}

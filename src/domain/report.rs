use super::ProductResult;

/// Daily digest of a batch scrape, split into updated and failed products
#[derive(Debug, Clone)]
pub struct ProductReport {
    pub updated: Vec<ProductResult>,
    pub failed: Vec<ProductResult>,
}

impl ProductReport {
    pub fn from_results(results: &[ProductResult]) -> Self {
        let (updated, failed): (Vec<_>, Vec<_>) =
            results.iter().cloned().partition(|r| r.success());

        Self { updated, failed }
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.failed.len()
    }

    pub fn subject(&self) -> String {
        format!(
            "Daily Product Update - {}/{} products updated",
            self.updated.len(),
            self.total()
        )
    }

    /// Format: subject line, one block per updated product, then the failures
    pub fn format(&self) -> String {
        let mut lines = vec![self.subject(), String::new()];

        for product in &self.updated {
            lines.push(format!("[{}] {}", product.retailer, product.name));
            lines.push(format!("  Price: {}", product.price));
            if !product.image.is_empty() {
                lines.push(format!("  Image: {}", product.image));
            }
            lines.push(format!("  Link: {}", product.url));
        }

        if !self.failed.is_empty() {
            if !self.updated.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("Unable to update ({} products):", self.failed.len()));
            for product in &self.failed {
                lines.push(format!("  ! {} - {}", product.url, product.name));
            }
        }

        lines.join("\n")
    }
}

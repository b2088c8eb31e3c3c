use crate::config::Config;
use crate::errors::TrackerResult;
use crate::retailers::traits::RetailerStrategy;
use crate::retailers::{LululemonRetailer, NikeRetailer};

pub struct RetailerRegistry {
    retailers: Vec<Box<dyn RetailerStrategy>>,
}

impl RetailerRegistry {
    pub fn new() -> Self {
        Self {
            retailers: Vec::new(),
        }
    }

    /// Registry with every built-in retailer, configured from `config`
    pub fn from_config(config: &Config) -> TrackerResult<Self> {
        let mut registry = Self::new();

        registry.register(Box::new(LululemonRetailer::new(
            config.retailer_settings(LululemonRetailer::NAME)?,
        )?));
        registry.register(Box::new(NikeRetailer::new(
            config.retailer_settings(NikeRetailer::NAME)?,
        )?));

        Ok(registry)
    }

    /// Add a retailer; a name that is already registered is replaced in place
    pub fn register(&mut self, retailer: Box<dyn RetailerStrategy>) {
        match self
            .retailers
            .iter_mut()
            .find(|r| r.name() == retailer.name())
        {
            Some(existing) => *existing = retailer,
            None => self.retailers.push(retailer),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn RetailerStrategy> {
        self.retailers
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// First registered retailer that supports the URL
    pub fn get_retailer_for_url(&self, url: &str) -> Option<&dyn RetailerStrategy> {
        self.retailers
            .iter()
            .find(|r| r.is_supported(url))
            .map(|r| r.as_ref())
    }

    pub fn supported_retailers(&self) -> Vec<&str> {
        self.retailers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.retailers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retailers.is_empty()
    }
}

impl Default for RetailerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetailerSettings;
    use crate::services::fetch_service::MockFetcher;

    fn registry() -> RetailerRegistry {
        let mut registry = RetailerRegistry::new();
        registry.register(Box::new(LululemonRetailer::with_fetcher(
            RetailerSettings::default(),
            Box::new(MockFetcher::new()),
        )));
        registry.register(Box::new(NikeRetailer::with_fetcher(
            RetailerSettings::default(),
            Box::new(MockFetcher::new()),
        )));
        registry
    }

    #[test]
    fn test_from_config_registers_builtin_retailers() {
        let registry = RetailerRegistry::from_config(&Config::default()).unwrap();

        assert_eq!(registry.supported_retailers(), vec!["lululemon", "nike"]);
        assert_eq!(registry.get("nike").unwrap().settings().retry_attempts, 4);
        assert_eq!(registry.get("lululemon").unwrap().settings().retry_attempts, 3);
    }

    #[test]
    fn test_lululemon_urls_detected() {
        let registry = registry();

        let urls = [
            "https://shop.lululemon.com/p/mens-jackets-and-outerwear/Down-For-It-All-Hoodie/_/prod9200786",
            "https://shop.lululemon.com/p/womens-leggings/Align-Pant-2/_/prod2020012?color=0001",
        ];

        for url in urls {
            let retailer = registry.get_retailer_for_url(url).unwrap();
            assert_eq!(
                retailer.name(),
                "lululemon",
                "URL {} should be handled by lululemon, not {}",
                url,
                retailer.name()
            );
        }
    }

    #[test]
    fn test_nike_urls_detected() {
        let registry = registry();

        let urls = [
            "https://www.nike.com/t/air-force-1-07-mens-shoes-jBrhbr/CW2288-111",
            "https://nike.com/t/pegasus-41",
        ];

        for url in urls {
            let retailer = registry.get_retailer_for_url(url).unwrap();
            assert_eq!(
                retailer.name(),
                "nike",
                "URL {} should be handled by nike, not {}",
                url,
                retailer.name()
            );
        }
    }

    #[test]
    fn test_unknown_urls_have_no_retailer() {
        let registry = registry();

        for url in ["https://www.adidas.com/us/samba", "https://example.com", "not a url"] {
            assert!(registry.get_retailer_for_url(url).is_none(), "{}", url);
        }
    }

    #[test]
    fn test_register_same_name_overwrites_in_place() {
        let mut registry = registry();

        registry.register(Box::new(LululemonRetailer::with_fetcher(
            RetailerSettings::default().with_retry_attempts(7),
            Box::new(MockFetcher::new()),
        )));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.supported_retailers(), vec!["lululemon", "nike"]);
        assert_eq!(registry.get("lululemon").unwrap().settings().retry_attempts, 7);
    }

    #[test]
    fn test_get_unknown_name() {
        let registry = RetailerRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.get("nike").is_none());
    }
}

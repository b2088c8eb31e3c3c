use reqwest::blocking::Client;

use crate::config::RetailerSettings;
use crate::errors::{TrackerError, TrackerResult};

/// Issues a single GET and hands back the raw body
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &str) -> TrackerResult<String>;
}

/// Blocking HTTP fetcher owning one client (session) per retailer
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &RetailerSettings) -> TrackerResult<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> TrackerResult<String> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}

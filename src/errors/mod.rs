use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Retailer errors
    #[error("Invalid product URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported retailer: {0}")]
    UnsupportedRetailer(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    // Parsing errors
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TrackerError {
    /// Whether a fetch attempt that failed with this error is worth repeating
    pub fn is_transient(&self) -> bool {
        matches!(self, TrackerError::Http(_) | TrackerError::HttpStatus { .. })
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_transient() {
        let err = TrackerError::HttpStatus {
            status: 503,
            url: "https://www.nike.com/t/x".to_string(),
        };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "HTTP 503 for https://www.nike.com/t/x");
    }

    #[test]
    fn test_extraction_errors_are_permanent() {
        let err = TrackerError::Extraction("missing markup".to_string());
        assert!(!err.is_transient());
    }
}

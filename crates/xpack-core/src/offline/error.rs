use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// True when the request never produced a response
    pub fn is_network_failure(&self) -> bool {
        matches!(self, CacheError::Network(_) | CacheError::FetchFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::HttpStatus {
            url: "https://example.com/static/css/app.css".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Unexpected status 404 for https://example.com/static/css/app.css");
        assert!(!err.is_network_failure());
        assert!(CacheError::FetchFailed("offline".to_string()).is_network_failure());
    }
}

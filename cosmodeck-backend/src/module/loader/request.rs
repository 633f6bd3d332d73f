///! Resource request descriptor
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_RETRIES: u32 = 1;

/// Target of one HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Absolute URL including the query string
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }
}

/// One logical fetch: a stable key plus where and how to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Stable resource key, e.g. "apod" or "iss-position"
    pub key: String,
    pub endpoint: Endpoint,
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub retries: u32,
}

impl ResourceRequest {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            endpoint: Endpoint::new(url),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint.headers.insert(name.into(), value.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Total number of attempts the loader may make
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = ResourceRequest::new("apod", "https://api.nasa.gov/planetary/apod");
        assert_eq!(req.timeout, Duration::from_millis(8000));
        assert_eq!(req.retries, 1);
        assert_eq!(req.attempts(), 2);
        assert!(req.endpoint.headers.is_empty());
    }

    #[test]
    fn test_builder() {
        let req = ResourceRequest::new("iss-position", "https://api.open-notify.org/iss-now.json")
            .with_timeout(Duration::from_millis(50))
            .with_retries(0)
            .with_header("Accept", "application/json");
        assert_eq!(req.attempts(), 1);
        assert_eq!(req.endpoint.headers.get("Accept").map(String::as_str), Some("application/json"));
    }
}

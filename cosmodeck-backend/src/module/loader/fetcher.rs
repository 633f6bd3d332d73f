///! Single-shot JSON fetcher
///!
///! Performs exactly one GET per call. Retrying is the loader's job.
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::error::ErrorKind;
use super::request::Endpoint;

const USER_AGENT: &str = concat!("cosmodeck/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `endpoint` and parse the body as JSON, giving up after `timeout`
    async fn fetch_json(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Value, ErrorKind>;
}

/// `reqwest`-backed fetcher sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_attempt(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Value, ErrorKind> {
        let mut request = self
            .client
            .get(&endpoint.url)
            .timeout(timeout)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::Http { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Value, ErrorKind> {
        tracing::debug!("GET {}", endpoint.url);

        // The client timeout covers the transfer, the outer one covers everything else
        let result = match tokio::time::timeout(timeout, self.fetch_attempt(endpoint, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        if let Err(e) = &result {
            tracing::debug!("GET {} failed: {}", endpoint.url, e);
        }
        result
    }
}

/// Fetcher for offline demos: every request fails without touching the network,
/// so each resource is served from its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch_json(&self, endpoint: &Endpoint, _timeout: Duration) -> Result<Value, ErrorKind> {
        tracing::trace!("Offline, skipping GET {}", endpoint.url);
        Err(ErrorKind::network("offline mode"))
    }
}

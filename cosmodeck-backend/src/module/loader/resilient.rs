///! Resilient data loader
///!
///! Wraps a `Fetcher` and a `FallbackProvider`: one attempt, an optional
///! retry after a short jittered backoff, then the registered fallback or a
///! failure. Never returns an error to the caller; every outcome is a
///! `ResourceResult`.
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ErrorKind;
use super::fallback::FallbackProvider;
use super::fetcher::Fetcher;
use super::request::ResourceRequest;
use super::result::ResourceResult;
use crate::module::sim::{FastRandom, RandomSource};

pub const DEFAULT_BACKOFF_MS: u64 = 300;
pub const DEFAULT_JITTER_MS: u64 = 100;

/// Delay before a retry: `base ± jitter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(DEFAULT_BACKOFF_MS),
            jitter: Duration::from_millis(DEFAULT_JITTER_MS),
        }
    }
}

impl Backoff {
    pub fn fixed(base: Duration) -> Self {
        Self { base, jitter: Duration::ZERO }
    }

    pub fn delay(&self, random: &dyn RandomSource) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        let low = self.base.saturating_sub(self.jitter).as_secs_f64();
        let high = (self.base + self.jitter).as_secs_f64();
        Duration::from_secs_f64(random.range_f64(low, high))
    }
}

/// Results of one concurrent batch, in request order
#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub id: Uuid,
    pub results: Vec<(String, ResourceResult<T>)>,
}

impl<T> Batch<T> {
    pub fn get(&self, key: &str) -> Option<&ResourceResult<T>> {
        self.results.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// (success, fallback, failure) counts
    pub fn tally(&self) -> (usize, usize, usize) {
        self.results.iter().fold((0, 0, 0), |(s, fb, fl), (_, r)| match r {
            ResourceResult::Success { .. } => (s + 1, fb, fl),
            ResourceResult::Fallback { .. } => (s, fb + 1, fl),
            ResourceResult::Failure { .. } => (s, fb, fl + 1),
        })
    }
}

pub struct Loader {
    fetcher: Arc<dyn Fetcher>,
    fallbacks: Arc<dyn FallbackProvider>,
    random: Arc<dyn RandomSource>,
    backoff: Backoff,
}

impl Loader {
    pub fn new(fetcher: Arc<dyn Fetcher>, fallbacks: Arc<dyn FallbackProvider>) -> Self {
        Self {
            fetcher,
            fallbacks,
            random: Arc::new(FastRandom::new()),
            backoff: Backoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Load one resource and decode it into `T`.
    ///
    /// A body that does not match `T` counts as a failed attempt
    /// (`ErrorKind::Parse`) and is retried / replaced like any other failure.
    pub async fn load<T>(&self, request: &ResourceRequest) -> ResourceResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let attempts = request.attempts();
        let mut attempt = 1;

        let reason = loop {
            match self.attempt::<T>(request).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("'{}' loaded on attempt {}/{}", request.key, attempt, attempts);
                    } else {
                        debug!("'{}' loaded", request.key);
                    }
                    return ResourceResult::success(value);
                }
                Err(e) if attempt < attempts => {
                    let delay = self.backoff.delay(self.random.as_ref());
                    warn!(
                        "Attempt {}/{} for '{}' failed: {}. Retrying in {:?}",
                        attempt, attempts, request.key, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => break e,
            }
        };

        self.recover(request, reason)
    }

    /// Load a resource without a schema
    pub async fn load_value(&self, request: &ResourceRequest) -> ResourceResult<Value> {
        self.load::<Value>(request).await
    }

    /// Load every request concurrently. One member failing never affects
    /// the others; the batch resolves once each member has its own result.
    pub async fn load_all<T>(&self, requests: &[ResourceRequest]) -> Batch<T>
    where
        T: DeserializeOwned + Send,
    {
        let id = Uuid::now_v7();
        debug!("Batch {} loading {} resources", id, requests.len());

        let results = join_all(requests.iter().map(|request| self.load::<T>(request))).await;
        let batch = Batch {
            id,
            results: requests.iter().map(|r| r.key.clone()).zip(results).collect(),
        };

        let (ok, fallback, failed) = batch.tally();
        info!(
            "Batch {} done: {} live, {} fallback, {} failed",
            id, ok, fallback, failed
        );
        batch
    }

    async fn attempt<T: DeserializeOwned>(&self, request: &ResourceRequest) -> Result<T, ErrorKind> {
        let value = self.fetcher.fetch_json(&request.endpoint, request.timeout).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn recover<T: DeserializeOwned>(&self, request: &ResourceRequest, reason: ErrorKind) -> ResourceResult<T> {
        let Some(substitute) = self.fallbacks.fallback(&request.key) else {
            warn!("'{}' unavailable and no fallback registered: {}", request.key, reason);
            return ResourceResult::failure(reason);
        };

        match serde_json::from_value(substitute) {
            Ok(value) => {
                warn!("'{}' unavailable ({}), serving fallback data", request.key, reason);
                ResourceResult::fallback(value, reason)
            }
            Err(e) => {
                // Registered with the wrong shape for this resource
                tracing::error!("Fallback for '{}' does not match its schema: {}", request.key, e);
                ResourceResult::failure(reason)
            }
        }
    }
}

///! Test helpers shared by unit and integration tests
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::module::loader::{Endpoint, ErrorKind, Fetcher};

/// One canned response of a `ScriptedFetcher`
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Result<Value, ErrorKind>,
    delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self { outcome: Ok(value), delay: Duration::ZERO }
    }

    pub fn status(status: u16) -> Self {
        Self { outcome: Err(ErrorKind::Http { status }), delay: Duration::ZERO }
    }

    pub fn network(message: &str) -> Self {
        Self { outcome: Err(ErrorKind::network(message)), delay: Duration::ZERO }
    }

    pub fn invalid_json() -> Self {
        Self { outcome: Err(ErrorKind::parse("expected value at line 1 column 1")), delay: Duration::ZERO }
    }

    /// Never answers; the caller's deadline always fires first
    pub fn hang() -> Self {
        Self { outcome: Ok(Value::Null), delay: Duration::MAX }
    }

    /// Answer only after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: Vec<Reply>,
    calls: usize,
}

/// In-memory `Fetcher` replaying scripted replies per URL.
///
/// Replies are consumed in order; the last one repeats once the script is
/// exhausted. Unknown URLs fail with a network error. Delays use
/// `tokio::time`, so tests can run with a paused clock.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, replies: Vec<Reply>) {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts.entry(url.to_string()).or_default();
        script.replies = replies;
    }

    /// Number of GETs issued for `url` so far
    pub fn calls(&self, url: &str) -> usize {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner).get(url).map(|s| s.calls).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner).values().map(|s| s.calls).sum()
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts.entry(url.to_string()).or_default();
        let index = script.calls.min(script.replies.len().saturating_sub(1));
        script.calls += 1;
        script.replies.get(index).cloned()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_json(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Value, ErrorKind> {
        let Some(reply) = self.next_reply(&endpoint.url) else {
            return Err(ErrorKind::network(format!("no script for {}", endpoint.url)));
        };

        if reply.delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Err(ErrorKind::Timeout);
        }
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}

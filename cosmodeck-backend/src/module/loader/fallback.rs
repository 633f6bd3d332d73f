///! Fallback provider
///!
///! Maps resource keys to substitute values used when a live fetch fails.
///! The table is assembled once at startup and never mutated afterwards,
///! so it is shared as `Arc<FallbackTable>` without locking.
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::module::sim::{Clock, RandomSource, SystemClock, FastRandom};

pub trait FallbackProvider: Send + Sync {
    /// Substitute for `key`, or `None` if nothing is registered
    fn fallback(&self, key: &str) -> Option<Value>;
}

/// Capabilities handed to generated entries
pub struct FallbackContext<'a> {
    pub clock: &'a dyn Clock,
    pub random: &'a dyn RandomSource,
}

type Generator = Arc<dyn Fn(&FallbackContext<'_>) -> Value + Send + Sync>;

#[derive(Clone)]
pub enum FallbackEntry {
    /// Fixed value returned verbatim
    Static(Value),
    /// Value built on demand from the injected clock and randomness
    Generated(Generator),
}

impl fmt::Debug for FallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackEntry::Static(v) => f.debug_tuple("Static").field(v).finish(),
            FallbackEntry::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

pub struct FallbackTable {
    entries: HashMap<String, FallbackEntry>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl FallbackTable {
    pub fn builder() -> FallbackTableBuilder {
        FallbackTableBuilder::default()
    }

    /// Table with no entries; every lookup is `None`
    pub fn empty() -> Self {
        Self::builder().build()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackTable")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl FallbackProvider for FallbackTable {
    fn fallback(&self, key: &str) -> Option<Value> {
        match self.entries.get(key)? {
            FallbackEntry::Static(value) => Some(value.clone()),
            FallbackEntry::Generated(generate) => {
                let ctx = FallbackContext {
                    clock: self.clock.as_ref(),
                    random: self.random.as_ref(),
                };
                Some(generate(&ctx))
            }
        }
    }
}

pub struct FallbackTableBuilder {
    entries: HashMap<String, FallbackEntry>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl Default for FallbackTableBuilder {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            clock: Arc::new(SystemClock),
            random: Arc::new(FastRandom::new()),
        }
    }
}

impl FallbackTableBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Register a fixed value. Later registrations for the same key win.
    pub fn insert<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(key.into(), FallbackEntry::Static(value));
        Ok(self)
    }

    pub fn insert_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), FallbackEntry::Static(value));
        self
    }

    /// Register a generator. It must not panic; serialization failures of
    /// its output should be mapped to a sensible static value by the caller.
    pub fn insert_with<F>(mut self, key: impl Into<String>, generate: F) -> Self
    where
        F: Fn(&FallbackContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(key.into(), FallbackEntry::Generated(Arc::new(generate)));
        self
    }

    /// Merge entries from a JSON object `{ "<key>": <value>, ... }`.
    /// Used for operator-supplied overrides.
    pub fn extend_from_json(mut self, object: &Value) -> Self {
        if let Some(map) = object.as_object() {
            for (key, value) in map {
                tracing::debug!("Fallback override registered for '{}'", key);
                self.entries.insert(key.clone(), FallbackEntry::Static(value.clone()));
            }
        } else {
            tracing::warn!("Ignoring fallback overrides: expected a JSON object");
        }
        self
    }

    pub fn build(self) -> FallbackTable {
        FallbackTable {
            entries: self.entries,
            clock: self.clock,
            random: self.random,
        }
    }
}

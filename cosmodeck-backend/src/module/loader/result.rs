///! Uniform outcome of one resource load
use serde::Serialize;

use super::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Remote,
    Fallback,
}

/// Exactly one of live data, substitute data, or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceResult<T> {
    Success { value: T, source: DataSource },
    Fallback { value: T, source: DataSource, reason: ErrorKind },
    Failure { reason: ErrorKind },
}

impl<T> ResourceResult<T> {
    pub fn success(value: T) -> Self {
        ResourceResult::Success { value, source: DataSource::Remote }
    }

    pub fn fallback(value: T, reason: ErrorKind) -> Self {
        ResourceResult::Fallback { value, source: DataSource::Fallback, reason }
    }

    pub fn failure(reason: ErrorKind) -> Self {
        ResourceResult::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResourceResult::Success { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResourceResult::Fallback { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResourceResult::Failure { .. })
    }

    /// Renderable value, live or substitute
    pub fn value(&self) -> Option<&T> {
        match self {
            ResourceResult::Success { value, .. } | ResourceResult::Fallback { value, .. } => Some(value),
            ResourceResult::Failure { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ResourceResult::Success { value, .. } | ResourceResult::Fallback { value, .. } => Some(value),
            ResourceResult::Failure { .. } => None,
        }
    }

    /// Terminal error, if the live fetch did not succeed
    pub fn reason(&self) -> Option<&ErrorKind> {
        match self {
            ResourceResult::Success { .. } => None,
            ResourceResult::Fallback { reason, .. } | ResourceResult::Failure { reason } => Some(reason),
        }
    }

    pub fn source(&self) -> Option<DataSource> {
        match self {
            ResourceResult::Success { source, .. } | ResourceResult::Fallback { source, .. } => Some(*source),
            ResourceResult::Failure { .. } => None,
        }
    }

    pub fn as_ref(&self) -> ResourceResult<&T> {
        match self {
            ResourceResult::Success { value, source } => ResourceResult::Success { value, source: *source },
            ResourceResult::Fallback { value, source, reason } => ResourceResult::Fallback {
                value,
                source: *source,
                reason: reason.clone(),
            },
            ResourceResult::Failure { reason } => ResourceResult::Failure { reason: reason.clone() },
        }
    }

    /// Transform the carried value, keeping the variant
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ResourceResult<U> {
        match self {
            ResourceResult::Success { value, source } => ResourceResult::Success { value: f(value), source },
            ResourceResult::Fallback { value, source, reason } => ResourceResult::Fallback {
                value: f(value),
                source,
                reason,
            },
            ResourceResult::Failure { reason } => ResourceResult::Failure { reason },
        }
    }
}

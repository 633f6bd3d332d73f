///! Type-erased screen section
///!
///! Lets screens mix binders of different view models (and sections
///! computed locally) behind one object-safe interface.
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use thiserror::Error;

use super::view_binder::{ViewBinder, ViewModel};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("failed to serialize view: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait Section: Send + Sync {
    fn name(&self) -> &str;

    async fn activate(&self);

    /// `false` if nothing was updated
    async fn refresh(&self) -> bool;

    fn deactivate(&self);

    fn is_active(&self) -> bool;

    /// Loader states and derived view as JSON. Non-empty `query` replaces
    /// the stored selection for this render only.
    fn render(&self, query: &HashMap<String, String>) -> Result<Value, RenderError>;
}

/// Parse a selection from query-string pairs
pub fn selection_from_query<S: serde::de::DeserializeOwned>(
    query: &HashMap<String, String>,
) -> Result<S, RenderError> {
    let object: Map<String, Value> = query
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    serde_json::from_value(Value::Object(object)).map_err(|e| RenderError::InvalidSelection(e.to_string()))
}

#[async_trait]
impl<V: ViewModel> Section for ViewBinder<V> {
    fn name(&self) -> &str {
        ViewBinder::name(self)
    }

    async fn activate(&self) {
        ViewBinder::activate(self).await
    }

    async fn refresh(&self) -> bool {
        ViewBinder::refresh(self).await
    }

    fn deactivate(&self) {
        ViewBinder::deactivate(self)
    }

    fn is_active(&self) -> bool {
        ViewBinder::is_active(self)
    }

    fn render(&self, query: &HashMap<String, String>) -> Result<Value, RenderError> {
        let selection = if query.is_empty() {
            self.selection()
        } else {
            selection_from_query::<V::Selection>(query)?
        };

        let snapshot = self.snapshot();
        let view = V::derive(&snapshot, &selection);

        let mut states = Map::new();
        for (key, state) in &snapshot.states {
            states.insert(key.clone(), serde_json::to_value(state)?);
        }

        Ok(json!({
            "name": ViewBinder::name(self),
            "active": ViewBinder::is_active(self),
            "states": states,
            "selection": serde_json::to_value(&selection)?,
            "view": serde_json::to_value(&view)?,
        }))
    }
}

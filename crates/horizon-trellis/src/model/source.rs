//! The data-access contract consumed by model adapters.

use std::sync::Arc;

use horizon_trellis_core::{Signal, Value};

/// Failure detail reported by a data source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct DataError {
    pub message: String,
    pub detail: Value,
}

impl DataError {
    /// Create an error without extra detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: Value::Null,
        }
    }

    /// Attach structured detail.
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Result notifications emitted by a [`DataSource`].
///
/// Cloning shares the underlying signals.
#[derive(Debug, Clone, Default)]
pub struct DataEvents {
    /// Emitted with the result rows of a `select`.
    pub selected: Signal<Vec<Value>>,
    /// Emitted when any verb fails.
    pub failed: Signal<DataError>,
}

impl DataEvents {
    /// Create a fresh pair of signals.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A data-access collaborator.
///
/// The verbs are fire-and-forget: results arrive later through
/// [`events`](DataSource::events). Sources may be shared by several views.
pub trait DataSource: Send + Sync {
    fn name(&self) -> Option<String>;
    fn set_name(&self, name: &str);

    fn select(&self, query: &Value);
    fn insert(&self, row: &Value);
    fn update(&self, row: &Value);
    fn delete(&self, row: &Value);

    fn events(&self) -> DataEvents;
}

/// Produces the data source backing a new model adapter.
pub type DataSourceFactory = Arc<dyn Fn() -> Arc<dyn DataSource> + Send + Sync>;

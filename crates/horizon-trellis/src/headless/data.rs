//! Recording data source.

use horizon_trellis_core::Value;
use parking_lot::Mutex;

use crate::model::{DataError, DataEvents, DataSource};

/// A data source that records every verb and answers `select` only when
/// told to.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    name: Mutex<Option<String>>,
    calls: Mutex<Vec<(String, Value)>>,
    rows: Mutex<Option<Vec<Value>>>,
    events: DataEvents,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `select` with `rows`.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let source = Self::new();
        *source.rows.lock() = Some(rows);
        source
    }

    /// Recorded `(verb, argument)` pairs, oldest first.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    /// Emit a `select` result.
    pub fn emit_rows(&self, rows: Vec<Value>) {
        self.events.selected.emit(rows);
    }

    /// Emit a failure.
    pub fn emit_error(&self, error: DataError) {
        self.events.failed.emit(error);
    }

    fn record(&self, verb: &str, argument: &Value) {
        self.calls.lock().push((verb.to_string(), argument.clone()));
    }
}

impl DataSource for MemoryDataSource {
    fn name(&self) -> Option<String> {
        self.name.lock().clone()
    }

    fn set_name(&self, name: &str) {
        *self.name.lock() = Some(name.to_string());
    }

    fn select(&self, query: &Value) {
        self.record("select", query);
        let rows = self.rows.lock().clone();
        if let Some(rows) = rows {
            self.emit_rows(rows);
        }
    }

    fn insert(&self, row: &Value) {
        self.record("insert", row);
    }

    fn update(&self, row: &Value) {
        self.record("update", row);
    }

    fn delete(&self, row: &Value) {
        self.record("delete", row);
    }

    fn events(&self) -> DataEvents {
        self.events.clone()
    }
}

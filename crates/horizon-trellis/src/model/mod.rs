//! Model adapters over data-access collaborators.
//!
//! A [`Model`] is a thin forwarding wrapper: `select`/`insert`/`update`/
//! `delete` go straight to the wrapped [`DataSource`], and its `select`
//! results are re-dispatched to whichever callback the view registered
//! (`iterate` per row, `bind` for the whole result, `empty` when nothing came
//! back). Data errors are logged and never propagate into the view tree.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_trellis::headless::MemoryDataSource;
//! use horizon_trellis::model::Model;
//! use horizon_trellis_core::Value;
//!
//! let source = Arc::new(MemoryDataSource::new());
//! let model = Model::new(source.clone());
//! model.iterate(|row| println!("row: {:?}", row));
//! model.select(&Value::Null);
//! source.emit_rows(vec![Value::from("first")]);
//! ```

mod adapter;
mod source;

pub use adapter::Model;
pub use source::{DataError, DataEvents, DataSource, DataSourceFactory};

//! Core systems for Horizon Trellis.
//!
//! This crate provides the foundational pieces shared by the composition
//! layer:
//!
//! - **Signals**: Subscriptions that return a disconnect handle per registration
//! - **Values**: Dynamically-typed attribute values for properties, styles and options
//! - **Errors**: The crate-wide error taxonomy
//!
//! # Signal Example
//!
//! ```
//! use horizon_trellis_core::Signal;
//!
//! let matches_changed = Signal::<bool>::new();
//!
//! let conn_id = matches_changed.connect(|matches| {
//!     println!("Query now matches: {}", matches);
//! });
//!
//! matches_changed.emit(true);
//! matches_changed.disconnect(conn_id);
//! ```
//!
//! # Value Example
//!
//! ```
//! use horizon_trellis_core::{map, Value};
//!
//! let style = map! { "color" => "red", "opacity" => 0.5 };
//! assert_eq!(style["opacity"].as_f64(), Some(0.5));
//! assert!(Value::Null.is_null());
//! ```

mod error;
pub mod signal;
pub mod value;

pub use error::{ChildKind, Error, Result};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use value::{Map, Value};

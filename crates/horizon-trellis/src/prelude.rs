//! Prelude module for Horizon Trellis.
//!
//! ```ignore
//! use horizon_trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - The view tree (`Dispatcher`, `View`, `ViewBehavior`)
//! - Elements and their definitions (`Element`, `Definition`, `ListenerMap`)
//! - Model adapters (`Model`, `DataSource`)
//! - Collaborator contracts (`RenderTarget`, `Node`, `Timeline`, ...)
//! - Core values and errors (`Value`, `Map`, `Error`, `Result`)

pub use crate::config::DispatcherConfig;
pub use crate::dispatcher::Dispatcher;
pub use crate::element::{Definition, DefinitionId, Element, ListenerMap, Matcher};
pub use crate::model::{DataSource, Model};
pub use crate::render::{handler, Event, EventHandler, ListenerContext, MediaQuery, Node, NodeRef, RenderTarget};
pub use crate::services::{CapabilityTester, I18n, Router};
pub use crate::timeline::{CompletionHandler, Ease, Easing, Timeline, Tween};
pub use crate::view::{View, ViewBehavior};

pub use horizon_trellis_core::{map, Error, Map, Result, Signal, Value};

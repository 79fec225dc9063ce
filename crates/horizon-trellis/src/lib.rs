//! Horizon Trellis - a hierarchical UI composition layer.
//!
//! Trellis builds a tree of [`View`]s, each owning child views, node
//! wrappers ([`Element`]s) and data adapters ([`Model`]s), and applies
//! responsive, predicate-gated presentation state to the nodes. A
//! [`Dispatcher`] resolves named views, wiring and building each one exactly
//! once, and hands out fresh elements and models.
//!
//! The host environment is never reached through globals: the render
//! target, timeline provider and services are injected into the dispatcher
//! and flow down the tree from there. The [`headless`] module provides
//! in-memory implementations of all of them.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::prelude::*;
//! use horizon_trellis::headless::HeadlessTarget;
//! use horizon_trellis_core::map;
//!
//! struct Card;
//!
//! impl ViewBehavior for Card {
//!     fn render(&self, view: &View) -> Option<Element> {
//!         let root = view.element(Some("root"), "article").ok()?;
//!         root.style(map! { "padding" => "16px" });
//!         root.match_all("(max-width: 600px)")
//!             .style(map! { "padding" => "4px" });
//!         Some(root)
//!     }
//! }
//!
//! fn main() -> horizon_trellis::Result<()> {
//!     let target = HeadlessTarget::new();
//!     let dispatcher = Dispatcher::builder(target.clone())
//!         .view("card", || View::new(Card))
//!         .build();
//!
//!     let card = dispatcher.get("card")?;
//!     let root = card.render().expect("card renders a root");
//!     target.set_matches("(max-width: 600px)", true);
//!
//!     let node = root.node().expect("root has a node");
//!     assert_eq!(node.style("padding"), Value::from("4px"));
//!
//!     card.destroy();
//!     Ok(())
//! }
//! ```

pub use horizon_trellis_core::*;

pub mod config;
pub mod dispatcher;
pub mod element;
pub mod headless;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod render;
pub mod services;
pub mod timeline;
pub mod view;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, DispatcherBuilder, ViewProvider};
pub use element::{Definition, DefinitionId, Element, Matcher};
pub use model::Model;
pub use view::{View, ViewBehavior, WeakView};

//! Render-target contracts.
//!
//! The composition layer never touches a concrete document model. Everything
//! it needs from the host (node creation, tree mutation, custom events,
//! media-query style predicates and listener registration) goes through the
//! traits in this module, and the render target is handed to the
//! [`Dispatcher`](crate::Dispatcher) explicitly at construction.
//!
//! # Key Types
//!
//! - [`RenderTarget`] - Creates nodes and predicate subscriptions
//! - [`Node`] - A single host node
//! - [`MediaQuery`] - A predicate with a current truth value and a change signal
//! - [`ListenerContext`] - Binds and unbinds event handlers on nodes
//!
//! See [`crate::headless`] for in-memory implementations.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use horizon_trellis_core::{Signal, Value};

/// Shared handle to a host node.
pub type NodeRef = Arc<dyn Node>;

/// Handler invoked when an event reaches a node.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Compare two node handles by identity.
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Compare two event handlers by identity.
pub fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Wrap a closure as an [`EventHandler`].
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A custom event dispatched on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name, e.g. `"click"`, `"append"` or `"destroy"`.
    pub name: String,
    /// Event payload.
    pub detail: Value,
}

impl Event {
    /// Create an event without payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Value::Null,
        }
    }

    /// Create an event carrying `detail`.
    pub fn with_detail(name: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// Layout metrics reported by a node.
///
/// Offsets are relative to the node's offset parent, in host pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeGeometry {
    pub offset_left: f64,
    pub offset_top: f64,
    pub offset_width: f64,
    pub offset_height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
    /// Left border width.
    pub client_left: f64,
    /// Top border width.
    pub client_top: f64,
}

/// A node owned by the host render target.
///
/// Writing [`Value::Null`] through [`set_property`](Node::set_property) or
/// [`set_style`](Node::set_style) resets the attribute to its neutral value.
pub trait Node: Send + Sync {
    /// The node type it was created with.
    fn kind(&self) -> &str;

    fn set_property(&self, key: &str, value: &Value);
    fn property(&self, key: &str) -> Value;

    fn set_style(&self, key: &str, value: &Value);
    fn style(&self, key: &str) -> Value;

    fn append_child(&self, child: &NodeRef);
    fn remove_child(&self, child: &NodeRef);

    /// Detach this node from its parent, if any.
    fn remove(&self);

    fn add_event_listener(&self, event: &str, handler: EventHandler);
    fn remove_event_listener(&self, event: &str, handler: &EventHandler);
    fn dispatch_event(&self, event: &Event);

    fn geometry(&self) -> NodeGeometry;
    fn offset_parent(&self) -> Option<NodeRef>;

    /// Access the concrete node type.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("kind", &self.kind()).finish()
    }
}

/// A conditional predicate (typically a media query) with a change channel.
pub trait MediaQuery: Send + Sync {
    /// The predicate source text.
    fn query(&self) -> &str;

    /// The current truth value.
    fn matches(&self) -> bool;

    /// Emits the new truth value whenever it changes.
    fn changed(&self) -> Signal<bool>;
}

impl fmt::Debug for dyn MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaQuery")
            .field("query", &self.query())
            .field("matches", &self.matches())
            .finish()
    }
}

/// The host environment the view tree renders into.
pub trait RenderTarget: Send + Sync {
    /// Create a detached node of the given type.
    fn create_node(&self, kind: &str) -> NodeRef;

    /// Subscribe to a predicate.
    fn match_media(&self, query: &str) -> Arc<dyn MediaQuery>;
}

/// Something that can bind event handlers to nodes.
///
/// Elements bind through their own node by default ([`NodeListeners`]); a
/// caller may pass any other context to route bindings through it instead.
pub trait ListenerContext: Send + Sync {
    fn bind_listener(&self, event: &str, node: &NodeRef, handler: &EventHandler);
    fn unbind_listener(&self, event: &str, node: &NodeRef, handler: &EventHandler);
}

/// The default [`ListenerContext`]: registers directly on the node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeListeners;

impl ListenerContext for NodeListeners {
    fn bind_listener(&self, event: &str, node: &NodeRef, handler: &EventHandler) {
        node.add_event_listener(event, Arc::clone(handler));
    }

    fn unbind_listener(&self, event: &str, node: &NodeRef, handler: &EventHandler) {
        node.remove_event_listener(event, handler);
    }
}

//! Headless render target.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_trellis_core::{Map, Signal, Value};
use parking_lot::Mutex;

use crate::render::{
    same_handler, same_node, Event, EventHandler, MediaQuery, Node, NodeGeometry, NodeRef,
    RenderTarget,
};

#[derive(Default)]
struct NodeState {
    properties: Map,
    styles: Map,
    children: Vec<NodeRef>,
    parent: Option<Weak<HeadlessNode>>,
    listeners: Vec<(String, EventHandler)>,
    dispatched: Vec<Event>,
    geometry: NodeGeometry,
    offset_parent: Option<NodeRef>,
}

/// An in-memory node.
pub struct HeadlessNode {
    kind: String,
    this: Weak<HeadlessNode>,
    state: Mutex<NodeState>,
}

impl HeadlessNode {
    pub fn new(kind: impl Into<String>) -> Arc<Self> {
        let kind = kind.into();
        Arc::new_cyclic(|this| Self {
            kind,
            this: this.clone(),
            state: Mutex::new(NodeState::default()),
        })
    }

    /// A new node as a [`NodeRef`].
    pub fn detached(kind: impl Into<String>) -> NodeRef {
        Self::new(kind)
    }

    /// View a node handle as a headless node.
    pub fn downcast(node: &NodeRef) -> Option<&HeadlessNode> {
        node.as_any().downcast_ref::<HeadlessNode>()
    }

    pub fn parent(&self) -> Option<NodeRef> {
        let parent = self.state.lock().parent.as_ref().and_then(Weak::upgrade);
        parent.map(|parent| parent as NodeRef)
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.state.lock().children.clone()
    }

    pub fn properties(&self) -> Map {
        self.state.lock().properties.clone()
    }

    pub fn styles(&self) -> Map {
        self.state.lock().styles.clone()
    }

    /// Number of handlers bound for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Every event dispatched on this node, oldest first.
    pub fn dispatched(&self) -> Vec<Event> {
        self.state.lock().dispatched.clone()
    }

    pub fn set_geometry(&self, geometry: NodeGeometry) {
        self.state.lock().geometry = geometry;
    }

    pub fn set_offset_parent(&self, parent: Option<NodeRef>) {
        self.state.lock().offset_parent = parent;
    }

    fn is(&self, node: &NodeRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(node), self as *const HeadlessNode)
    }
}

impl Node for HeadlessNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn set_property(&self, key: &str, value: &Value) {
        let mut state = self.state.lock();
        if value.is_null() {
            state.properties.remove(key);
        } else {
            state.properties.insert(key.to_string(), value.clone());
        }
    }

    fn property(&self, key: &str) -> Value {
        self.state.lock().properties.get(key).cloned().unwrap_or_default()
    }

    fn set_style(&self, key: &str, value: &Value) {
        let mut state = self.state.lock();
        if value.is_null() {
            state.styles.remove(key);
        } else {
            state.styles.insert(key.to_string(), value.clone());
        }
    }

    fn style(&self, key: &str) -> Value {
        self.state.lock().styles.get(key).cloned().unwrap_or_default()
    }

    fn append_child(&self, child: &NodeRef) {
        if let Some(headless) = HeadlessNode::downcast(child) {
            headless.remove();
            headless.state.lock().parent = Some(self.this.clone());
        }
        self.state.lock().children.push(Arc::clone(child));
    }

    fn remove_child(&self, child: &NodeRef) {
        self.state
            .lock()
            .children
            .retain(|existing| !same_node(existing, child));
        if let Some(headless) = HeadlessNode::downcast(child) {
            let mut child_state = headless.state.lock();
            let ours = child_state
                .parent
                .as_ref()
                .is_some_and(|parent| std::ptr::eq(parent.as_ptr(), self));
            if ours {
                child_state.parent = None;
            }
        }
    }

    fn remove(&self) {
        let parent = self.state.lock().parent.take();
        if let Some(parent) = parent.and_then(|parent| parent.upgrade()) {
            parent.state.lock().children.retain(|child| !self.is(child));
        }
    }

    fn add_event_listener(&self, event: &str, handler: EventHandler) {
        self.state.lock().listeners.push((event.to_string(), handler));
    }

    fn remove_event_listener(&self, event: &str, handler: &EventHandler) {
        self.state
            .lock()
            .listeners
            .retain(|(name, existing)| !(name == event && same_handler(existing, handler)));
    }

    fn dispatch_event(&self, event: &Event) {
        let handlers: Vec<EventHandler> = {
            let mut state = self.state.lock();
            state.dispatched.push(event.clone());
            state
                .listeners
                .iter()
                .filter(|(name, _)| *name == event.name)
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        for handler in handlers {
            handler(event);
        }
    }

    fn geometry(&self) -> NodeGeometry {
        self.state.lock().geometry
    }

    fn offset_parent(&self) -> Option<NodeRef> {
        self.state.lock().offset_parent.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HeadlessNode")
            .field("kind", &self.kind)
            .field("properties", &state.properties)
            .field("styles", &state.styles)
            .field("children", &state.children.len())
            .finish()
    }
}

/// A switchable predicate.
#[derive(Debug)]
pub struct HeadlessMediaQuery {
    query: String,
    matches: AtomicBool,
    changed: Signal<bool>,
}

impl HeadlessMediaQuery {
    pub fn new(query: impl Into<String>, matches: bool) -> Self {
        Self {
            query: query.into(),
            matches: AtomicBool::new(matches),
            changed: Signal::new(),
        }
    }

    /// Set the truth value, emitting the change signal if it differs.
    pub fn set_matches(&self, matches: bool) {
        if self.matches.swap(matches, Ordering::SeqCst) != matches {
            self.changed.emit(matches);
        }
    }
}

impl MediaQuery for HeadlessMediaQuery {
    fn query(&self) -> &str {
        &self.query
    }

    fn matches(&self) -> bool {
        self.matches.load(Ordering::SeqCst)
    }

    fn changed(&self) -> Signal<bool> {
        self.changed.clone()
    }
}

/// An in-memory render target.
///
/// Media queries are shared per query string and start out not matching.
#[derive(Debug, Default)]
pub struct HeadlessTarget {
    queries: Mutex<HashMap<String, Arc<HeadlessMediaQuery>>>,
    created: Mutex<Vec<NodeRef>>,
}

impl HeadlessTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The predicate registered for `query`, created on first use.
    pub fn media_query(&self, query: &str) -> Arc<HeadlessMediaQuery> {
        let mut queries = self.queries.lock();
        let entry = queries
            .entry(query.to_string())
            .or_insert_with(|| Arc::new(HeadlessMediaQuery::new(query, false)));
        Arc::clone(entry)
    }

    /// Flip `query`, notifying subscribers if its value changed.
    pub fn set_matches(&self, query: &str, matches: bool) {
        self.media_query(query).set_matches(matches);
    }

    /// Every node created so far.
    pub fn created_nodes(&self) -> Vec<NodeRef> {
        self.created.lock().clone()
    }
}

impl RenderTarget for HeadlessTarget {
    fn create_node(&self, kind: &str) -> NodeRef {
        let node = HeadlessNode::detached(kind);
        self.created.lock().push(Arc::clone(&node));
        node
    }

    fn match_media(&self, query: &str) -> Arc<dyn MediaQuery> {
        self.media_query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::handler;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_append_reparents() {
        let a = HeadlessNode::detached("div");
        let b = HeadlessNode::detached("div");
        let child = HeadlessNode::detached("span");

        a.append_child(&child);
        b.append_child(&child);

        let a = HeadlessNode::downcast(&a).unwrap();
        let b_headless = HeadlessNode::downcast(&b).unwrap();
        assert!(a.children().is_empty());
        assert_eq!(b_headless.children().len(), 1);

        let child_headless = HeadlessNode::downcast(&child).unwrap();
        assert!(child_headless.parent().is_some_and(|p| same_node(&p, &b)));

        child.remove();
        assert!(b_headless.children().is_empty());
        assert!(child_headless.parent().is_none());
    }

    #[test]
    fn test_null_clears_attributes() {
        let node = HeadlessNode::detached("div");
        node.set_style("color", &Value::from("red"));
        assert_eq!(node.style("color"), Value::from("red"));
        node.set_style("color", &Value::Null);
        assert!(HeadlessNode::downcast(&node).unwrap().styles().is_empty());
    }

    #[test]
    fn test_listeners_by_identity() {
        let node = HeadlessNode::detached("button");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let on_click = handler(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        let other = handler(|_| {});

        node.add_event_listener("click", on_click.clone());
        node.add_event_listener("click", other);
        node.remove_event_listener("click", &on_click);
        node.dispatch_event(&Event::new("click"));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(HeadlessNode::downcast(&node).unwrap().listener_count("click"), 1);
    }

    #[test]
    fn test_media_query_emits_on_change_only() {
        let target = HeadlessTarget::new();
        let query = target.match_media("(min-width: 800px)");
        let flips = Arc::new(AtomicUsize::new(0));
        let flips_clone = flips.clone();
        query.changed().connect(move |_| {
            flips_clone.fetch_add(1, Ordering::SeqCst);
        });

        target.set_matches("(min-width: 800px)", true);
        target.set_matches("(min-width: 800px)", true);
        target.set_matches("(min-width: 800px)", false);
        assert_eq!(flips.load(Ordering::SeqCst), 2);
        assert!(!query.matches());
    }
}

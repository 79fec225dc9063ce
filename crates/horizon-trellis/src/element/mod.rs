//! Elements: owned node wrappers with gated presentation state.
//!
//! An [`Element`] wraps one host node and applies *definitions* to it:
//! property maps, style maps, listener maps and animations. Each definition
//! call can be gated by a [`Matcher`] armed just before it:
//!
//! - [`Element::match_query`] arms a one-shot matcher for the next call only.
//! - [`Element::match_all`] arms a persistent matcher that gates every
//!   following call and keeps re-evaluating for the element's lifetime.
//! - With no matcher armed, a definition applies unconditionally, once.
//!
//! Properties and styles go through a per-attribute history overlay (see
//! [`history`]) so that several independently toggling definitions can share
//! an attribute and unwind correctly in any order.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::element::Element;
//! use horizon_trellis::headless::HeadlessTarget;
//! use horizon_trellis_core::{map, Value};
//!
//! let target = HeadlessTarget::new();
//! let element = Element::new(target.clone());
//! element.create("div", Some("card"));
//!
//! element.style(map! { "color" => "red" });
//! element
//!     .match_all("(max-width: 600px)")
//!     .style(map! { "color" => "blue" });
//!
//! target.set_matches("(max-width: 600px)", true);
//! let node = element.node().expect("created");
//! assert_eq!(node.style("color"), Value::from("blue"));
//!
//! target.set_matches("(max-width: 600px)", false);
//! assert_eq!(node.style("color"), Value::from("red"));
//! ```

mod animation;
mod definition;
pub mod history;
mod matcher;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_trellis_core::{Error, Map, Result, Value};
use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::logging::targets;
use crate::render::{Event, ListenerContext, NodeListeners, NodeRef, RenderTarget};
use crate::timeline::Tween;
use crate::view::{View, WeakView};

pub use animation::{AnimationOptions, DEFAULT_DURATION_MS};
pub use definition::{Definition, DefinitionId, ListenerMap};
pub use history::{History, Retraction};
pub use matcher::Matcher;

use matcher::MatcherBinding;

/// Width and height of an element's node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Absolute position of an element's node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone)]
enum Binding {
    Properties(Definition<Map>),
    Style(Definition<Map>),
    Listeners {
        definition: Definition<ListenerMap>,
        context: Arc<dyn ListenerContext>,
    },
    Animation {
        definition: Definition<Map>,
        context: Option<WeakView>,
    },
}

/// Gate state a definition is applied under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// No matcher: applied once, never retracted.
    Always,
    Open,
    Closed,
}

impl Gate {
    fn is_set(self) -> bool {
        self != Gate::Closed
    }
}

#[derive(Clone, Copy)]
enum Domain {
    Property,
    Style,
}

impl Domain {
    fn write(self, node: &NodeRef, key: &str, value: &Value) {
        match self {
            Domain::Property => node.set_property(key, value),
            Domain::Style => node.set_style(key, value),
        }
    }
}

#[derive(Default)]
struct ElementState {
    id: Option<String>,
    node: Option<NodeRef>,
    view: Option<WeakView>,
    armed: Option<Matcher>,
    skip_next: bool,
    bindings: Vec<MatcherBinding>,
    definitions: SlotMap<DefinitionId, Binding>,
    listeners: HashMap<DefinitionId, (Arc<dyn ListenerContext>, ListenerMap)>,
    properties: History,
    styles: History,
    data: HashMap<String, Value>,
}

struct ElementInner {
    target: Arc<dyn RenderTarget>,
    state: Mutex<ElementState>,
    destroyed: AtomicBool,
}

/// A single node wrapper owned by one view.
///
/// `Element` is a cheap handle; clones refer to the same element. Using an
/// element after [`destroy`](Element::destroy) is a logic error: calls are
/// ignored or act on an empty element.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

/// Non-owning element handle.
#[derive(Clone, Default)]
pub struct WeakElement(Weak<ElementInner>);

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(|inner| Element { inner })
    }
}

impl Element {
    /// Create a bare element rendering into `target`.
    ///
    /// Call [`create`](Element::create) or [`set_node`](Element::set_node)
    /// before applying definitions.
    pub fn new(target: Arc<dyn RenderTarget>) -> Self {
        Self {
            inner: Arc::new(ElementInner {
                target,
                state: Mutex::new(ElementState::default()),
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    /// Create the underlying node.
    ///
    /// When the element belongs to a wired view, the node id is drawn from
    /// the dispatcher's counter so that ids stay unique across the tree.
    pub fn create(&self, kind: &str, id: Option<&str>) -> &Self {
        let node = self.inner.target.create_node(kind);
        let node_id = self
            .view()
            .and_then(|view| view.count(id))
            .or_else(|| id.map(str::to_string));
        if let Some(node_id) = node_id {
            node.set_property("id", &Value::String(node_id));
        }

        let mut state = self.inner.state.lock();
        state.id = id.map(str::to_string);
        state.node = Some(node);
        self
    }

    /// The registry id this element was created with.
    pub fn id(&self) -> Option<String> {
        self.inner.state.lock().id.clone()
    }

    pub fn node(&self) -> Option<NodeRef> {
        self.inner.state.lock().node.clone()
    }

    /// Adopt an existing node.
    pub fn set_node(&self, node: NodeRef) -> &Self {
        self.inner.state.lock().node = Some(node);
        self
    }

    /// The owning view, if it is still alive.
    pub fn view(&self) -> Option<View> {
        self.inner.state.lock().view.as_ref().and_then(WeakView::upgrade)
    }

    pub(crate) fn set_view(&self, view: &View) -> &Self {
        self.inner.state.lock().view = Some(view.downgrade());
        self
    }

    pub fn data(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().data.get(key).cloned()
    }

    pub fn set_data(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner.state.lock().data.insert(key.into(), value.into());
        self
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.inner.state.lock().data.contains_key(key)
    }

    pub fn remove_data(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().data.remove(key)
    }

    /// Create or register an element in the owning view.
    pub fn element(&self, id: Option<&str>, kind: &str) -> Result<Element> {
        self.view()
            .ok_or(Error::service_unavailable("view"))?
            .element(id, kind)
    }

    /// Resolve a named view through the owning view.
    pub fn child_view(&self, id: Option<&str>, name: &str) -> Result<View> {
        self.view()
            .ok_or(Error::service_unavailable("view"))?
            .view(id, name)
    }

    /// Arm a one-shot matcher for the next definition call.
    pub fn match_query(&self, query: &str) -> &Self {
        let query = self.inner.target.match_media(query);
        self.arm(Matcher::OneShot(query))
    }

    /// Arm a persistent matcher for every following definition call.
    pub fn match_all(&self, query: &str) -> &Self {
        let query = self.inner.target.match_media(query);
        self.arm(Matcher::Persistent(query))
    }

    /// Arm an explicit matcher.
    pub fn arm(&self, matcher: Matcher) -> &Self {
        tracing::trace!(target: targets::MATCHER, ?matcher, "matcher armed");
        self.inner.state.lock().armed = Some(matcher);
        self
    }

    /// Disarm the current matcher; following calls apply unconditionally.
    pub fn disarm(&self) -> &Self {
        self.inner.state.lock().armed = None;
        self
    }

    /// The currently armed matcher.
    pub fn armed(&self) -> Option<Matcher> {
        self.inner.state.lock().armed.clone()
    }

    /// Guard the next definition call: with `false` that call is skipped
    /// entirely and leaves the armed matcher in place.
    ///
    /// The guard resets after one call either way.
    pub fn when(&self, test: bool) -> &Self {
        self.inner.state.lock().skip_next = !test;
        self
    }

    /// Apply node properties, gated by the armed matcher.
    pub fn properties(&self, definition: impl Into<Definition<Map>>) -> DefinitionId {
        self.define(Binding::Properties(definition.into()))
    }

    /// Apply style declarations, gated by the armed matcher.
    pub fn style(&self, definition: impl Into<Definition<Map>>) -> DefinitionId {
        self.define(Binding::Style(definition.into()))
    }

    /// Bind event handlers, gated by the armed matcher.
    ///
    /// Handlers are bound through `context`, or directly on the node when
    /// `None`.
    pub fn listen(
        &self,
        definition: impl Into<Definition<ListenerMap>>,
        context: Option<Arc<dyn ListenerContext>>,
    ) -> DefinitionId {
        let context = context.unwrap_or_else(|| Arc::new(NodeListeners));
        self.define(Binding::Listeners {
            definition: definition.into(),
            context,
        })
    }

    /// Add a tween to the timeline of `context` (default: the owning view)
    /// whenever the gate is true. Never retracts.
    pub fn animate(
        &self,
        definition: impl Into<Definition<Map>>,
        context: Option<&View>,
    ) -> DefinitionId {
        self.define(Binding::Animation {
            definition: definition.into(),
            context: context.map(View::downgrade),
        })
    }

    /// The definition currently owning property `key`.
    pub fn property_owner(&self, key: &str) -> Option<DefinitionId> {
        self.inner.state.lock().properties.owner(key)
    }

    /// The definition currently owning style `key`.
    pub fn style_owner(&self, key: &str) -> Option<DefinitionId> {
        self.inner.state.lock().styles.owner(key)
    }

    /// Number of live matcher subscriptions.
    pub fn matcher_count(&self) -> usize {
        self.inner.state.lock().bindings.len()
    }

    /// Register `binding` and apply it through the armed matcher.
    ///
    /// Skipped and ungated calls get an id that owns no registration: an
    /// ungated definition is applied once and never re-evaluated.
    fn define(&self, binding: Binding) -> DefinitionId {
        let (id, matcher) = {
            let mut state = self.inner.state.lock();
            let skip = std::mem::take(&mut state.skip_next);
            let matcher = if skip { None } else { state.armed.clone() };
            if matcher.as_ref().is_some_and(|m| !m.is_persistent()) {
                state.armed = None;
            }

            let id = state.definitions.insert(binding.clone());
            if skip {
                state.definitions.remove(id);
                tracing::trace!(target: targets::ELEMENT, ?id, "definition skipped");
                return id;
            }
            if matcher.is_none() {
                state.definitions.remove(id);
            }
            (id, matcher)
        };

        match matcher {
            Some(matcher) => {
                let set = self.bind_matcher(id, &matcher);
                self.apply(id, set, false);
            }
            None => self.apply_binding(id, &binding, Gate::Always, false),
        }
        id
    }

    /// Subscribe definition `id` to `matcher` and return the initial gate
    /// value.
    fn bind_matcher(&self, id: DefinitionId, matcher: &Matcher) -> bool {
        let weak = Arc::downgrade(&self.inner);
        let query = Arc::clone(matcher.query());
        let connection = query.changed().connect(move |&matches| {
            if let Some(inner) = weak.upgrade() {
                Element { inner }.handle_match(id, matches);
            }
        });
        self.inner
            .state
            .lock()
            .bindings
            .push(MatcherBinding::new(query, connection));

        matcher.matches()
    }

    fn handle_match(&self, id: DefinitionId, matches: bool) {
        if self.is_destroyed() {
            tracing::trace!(target: targets::MATCHER, ?id, "dropping matcher change after destroy");
            return;
        }
        tracing::debug!(target: targets::MATCHER, ?id, matches, "matcher changed");
        self.apply(id, matches, true);
    }

    fn apply(&self, id: DefinitionId, set: bool, replay: bool) {
        let binding = self.inner.state.lock().definitions.get(id).cloned();
        if let Some(binding) = binding {
            let gate = if set { Gate::Open } else { Gate::Closed };
            self.apply_binding(id, &binding, gate, replay);
        }
    }

    fn apply_binding(&self, id: DefinitionId, binding: &Binding, gate: Gate, replay: bool) {
        match binding {
            Binding::Properties(definition) => {
                self.set_attributes(id, definition, gate, Domain::Property)
            }
            Binding::Style(definition) => self.set_attributes(id, definition, gate, Domain::Style),
            Binding::Listeners {
                definition,
                context,
            } => self.set_listeners(id, definition, context.clone(), gate.is_set()),
            Binding::Animation {
                definition,
                context,
            } => self.set_animation(definition, context.clone(), gate.is_set(), replay),
        }
    }

    fn set_attributes(&self, id: DefinitionId, definition: &Definition<Map>, gate: Gate, domain: Domain) {
        let values = definition.resolve(self);

        let (node, writes) = {
            let mut state = self.inner.state.lock();
            let history = match domain {
                Domain::Property => &mut state.properties,
                Domain::Style => &mut state.styles,
            };

            let mut writes = Vec::with_capacity(values.len());
            for (key, value) in values {
                match gate {
                    Gate::Always => history.assert_unconditional(id, &key, value.clone()),
                    Gate::Open => history.assert(id, &key, value.clone()),
                    Gate::Closed => {
                        match history.retract(id, &key) {
                            Retraction::Untouched => {}
                            Retraction::Restore(previous) => writes.push((key, previous)),
                            Retraction::Reset => writes.push((key, Value::Null)),
                        }
                        continue;
                    }
                }
                writes.push((key, value));
            }
            (state.node.clone(), writes)
        };

        if let Some(node) = node {
            for (key, value) in &writes {
                domain.write(&node, key, value);
            }
        }
    }

    fn set_listeners(
        &self,
        id: DefinitionId,
        definition: &Definition<ListenerMap>,
        context: Arc<dyn ListenerContext>,
        set: bool,
    ) {
        let Some(node) = self.node() else {
            return;
        };

        if set {
            if self.inner.state.lock().listeners.contains_key(&id) {
                return;
            }
            let handlers = definition.resolve(self);
            for (event, handler) in &handlers {
                context.bind_listener(event, &node, handler);
            }
            self.inner
                .state
                .lock()
                .listeners
                .insert(id, (context, handlers));
        } else {
            let bound = self.inner.state.lock().listeners.remove(&id);
            if let Some((context, handlers)) = bound {
                for (event, handler) in &handlers {
                    context.unbind_listener(event, &node, handler);
                }
            }
        }
    }

    fn set_animation(
        &self,
        definition: &Definition<Map>,
        context: Option<WeakView>,
        set: bool,
        replay: bool,
    ) {
        if !set {
            return;
        }

        let mut properties = definition.resolve(self);
        if replay {
            properties.insert("play".to_string(), Value::Bool(true));
        }

        let view = context
            .as_ref()
            .and_then(WeakView::upgrade)
            .or_else(|| self.view());
        let default_duration = view
            .as_ref()
            .and_then(View::dispatcher)
            .map_or(DEFAULT_DURATION_MS, |dispatcher| dispatcher.default_duration_ms());
        let options = AnimationOptions::extract(&mut properties, default_duration);

        let Some(node) = self.node() else {
            return;
        };

        let timeline = view.as_ref().and_then(View::timeline);
        let (Some(view), Some(timeline)) = (view, timeline) else {
            for (key, value) in &properties {
                node.set_style(key, value);
            }
            return;
        };

        if let Some(count) = options.repeat {
            timeline.set_repeat(count);
        }
        let position = options.start_offset(timeline.as_ref());
        tracing::trace!(target: targets::ELEMENT, ?position, duration = options.duration_secs(), "adding tween");
        timeline.to(Tween {
            node,
            duration: options.duration_secs(),
            properties,
            position,
            ease: options.ease.clone(),
        });

        if options.play {
            view.play(None);
        }
    }

    /// Append `child`'s node under this element's node.
    pub fn append(&self, child: &Element) -> &Self {
        if let (Some(node), Some(child_node)) = (self.node(), child.node()) {
            node.append_child(&child_node);
            child.emit("append", self.id());
        }
        self
    }

    /// Append this element under `parent`.
    pub fn append_to(&self, parent: &Element) -> &Self {
        parent.append(self);
        self
    }

    /// Resolve a named child view, render it and append its root element.
    pub fn append_view(&self, id: Option<&str>, name: &str) -> Result<View> {
        let child = self.child_view(id, name)?;
        if let Some(root) = child.render() {
            self.append(&root);
        }
        Ok(child)
    }

    /// Remove `child`'s node from this element's node.
    pub fn detach(&self, child: &Element) -> &Self {
        if let (Some(node), Some(child_node)) = (self.node(), child.node()) {
            node.remove_child(&child_node);
            child.emit("remove", self.id());
        }
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        self.node()
            .map(|node| {
                let geometry = node.geometry();
                Dimensions {
                    width: geometry.offset_width,
                    height: geometry.offset_height,
                }
            })
            .unwrap_or_default()
    }

    /// Position accumulated over the chain of offset parents.
    pub fn position(&self) -> Position {
        let mut position = Position::default();
        let mut current = self.node();

        while let Some(node) = current {
            let geometry = node.geometry();
            position.x += geometry.offset_left - geometry.scroll_left + geometry.client_left;
            position.y += geometry.offset_top - geometry.scroll_top + geometry.client_top;
            current = node.offset_parent();
        }

        position
    }

    /// Dispatch a custom event on the node.
    pub fn emit(&self, name: &str, detail: impl Into<Value>) -> &Self {
        if let Some(node) = self.node() {
            node.dispatch_event(&Event::with_detail(name, detail));
        }
        self
    }

    /// Tear the element down.
    ///
    /// Emits `"destroy"` first, then unbinds listeners and matcher
    /// subscriptions, leaves the owning view's registry and removes the node.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.emit("destroy", Value::Null);

        let (listeners, bindings, view, node) = {
            let mut state = self.inner.state.lock();
            let listeners = std::mem::take(&mut state.listeners);
            let bindings = std::mem::take(&mut state.bindings);
            let view = state.view.take();
            let node = state.node.take();
            state.armed = None;
            state.definitions.clear();
            state.properties.clear();
            state.styles.clear();
            state.data.clear();
            (listeners, bindings, view, node)
        };

        if let Some(node) = &node {
            for (context, handlers) in listeners.into_values() {
                for (event, handler) in &handlers {
                    context.unbind_listener(event, node, handler);
                }
            }
        }
        for binding in bindings {
            binding.unbind();
        }
        if let Some(view) = view.as_ref().and_then(WeakView::upgrade) {
            view.detach_element(self);
        }
        if let Some(node) = node {
            node.remove();
        }

        tracing::trace!(target: targets::ELEMENT, id = ?self.id(), "element destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Arc::downgrade(&self.inner))
    }

    /// Compare two handles by identity.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Element")
            .field("id", &state.id)
            .field("kind", &state.node.as_ref().map(|node| node.kind().to_string()))
            .field("definitions", &state.definitions.len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

static_assertions::assert_impl_all!(Element: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessNode, HeadlessTarget};
    use crate::render::{handler, MediaQuery, NodeGeometry};
    use horizon_trellis_core::map;
    use std::sync::atomic::AtomicUsize;

    const NARROW: &str = "(max-width: 600px)";
    const DARK: &str = "(prefers-color-scheme: dark)";

    fn setup() -> (Arc<HeadlessTarget>, Element, NodeRef) {
        let target = HeadlessTarget::new();
        let element = Element::new(target.clone());
        element.create("div", Some("box"));
        let node = element.node().expect("node created");
        (target, element, node)
    }

    #[test]
    fn test_create_assigns_id_without_view() {
        let (_, element, node) = setup();
        assert_eq!(element.id().as_deref(), Some("box"));
        assert_eq!(node.kind(), "div");
        assert_eq!(node.property("id"), Value::from("box"));
    }

    #[test]
    fn test_unconditional_properties() {
        let (_, element, node) = setup();
        let id = element.properties(map! { "title" => "hello" });
        assert_eq!(node.property("title"), Value::from("hello"));
        assert_eq!(element.property_owner("title"), Some(id));
        assert_eq!(element.matcher_count(), 0);
    }

    #[test]
    fn test_match_gates_only_next_call() {
        let (target, element, node) = setup();
        element.match_query(NARROW).style(map! { "width" => "100%" });
        assert!(element.armed().is_none());
        assert_eq!(node.style("width"), Value::Null);

        element.style(map! { "height" => "50px" });
        assert_eq!(node.style("height"), Value::from("50px"));

        target.set_matches(NARROW, true);
        assert_eq!(node.style("width"), Value::from("100%"));
        assert_eq!(element.matcher_count(), 1);
    }

    #[test]
    fn test_match_all_stays_armed() {
        let (target, element, node) = setup();
        element.match_all(NARROW);
        element.style(map! { "width" => "100%" });
        element.properties(map! { "hidden" => true });
        assert!(element.armed().is_some_and(|m| m.is_persistent()));
        assert_eq!(element.matcher_count(), 2);

        for _ in 0..3 {
            target.set_matches(NARROW, true);
            assert_eq!(node.style("width"), Value::from("100%"));
            assert_eq!(node.property("hidden"), Value::Bool(true));
            target.set_matches(NARROW, false);
            assert_eq!(node.style("width"), Value::Null);
            assert_eq!(node.property("hidden"), Value::Null);
        }
    }

    #[test]
    fn test_retraction_keeps_newer_owner() {
        let (target, element, node) = setup();
        let d1 = element.match_query(NARROW).style(map! { "color" => "red" });
        let d2 = element.match_query(DARK).style(map! { "color" => "blue" });

        target.set_matches(NARROW, true);
        target.set_matches(DARK, true);
        assert_eq!(element.style_owner("color"), Some(d2));

        target.set_matches(NARROW, false);
        assert_eq!(node.style("color"), Value::from("blue"));
        assert_eq!(element.style_owner("color"), Some(d2));
        assert_ne!(element.style_owner("color"), Some(d1));
    }

    #[test]
    fn test_lazy_definition_evaluated_at_apply_time() {
        let (target, element, node) = setup();
        element.set_data("label", "first");
        element
            .match_all(NARROW)
            .properties(Definition::lazy(|el: &Element| {
                map! { "title" => el.data("label").unwrap_or_default() }
            }));

        element.set_data("label", "second");
        target.set_matches(NARROW, true);
        assert_eq!(node.property("title"), Value::from("second"));
    }

    #[test]
    fn test_listen_binds_and_unbinds_with_gate() {
        let (target, element, node) = setup();
        let clicks = Arc::new(AtomicUsize::new(0));
        let clicks_clone = clicks.clone();
        let on_click = handler(move |_| {
            clicks_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut listeners = ListenerMap::new();
        listeners.insert("click".to_string(), on_click);
        element.match_all(NARROW).listen(listeners, None);

        let headless = HeadlessNode::downcast(&node).expect("headless node");
        assert_eq!(headless.listener_count("click"), 0);

        target.set_matches(NARROW, true);
        target.set_matches(NARROW, true);
        assert_eq!(headless.listener_count("click"), 1);
        node.dispatch_event(&Event::new("click"));
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        target.set_matches(NARROW, false);
        assert_eq!(headless.listener_count("click"), 0);
        node.dispatch_event(&Event::new("click"));
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_animate_without_timeline_applies_styles() {
        let (_, element, node) = setup();
        element.animate(map! { "opacity" => 0.5, "duration" => 300, "ease" => "easeIn" }, None);
        assert_eq!(node.style("opacity"), Value::Float(0.5));
        assert_eq!(node.style("duration"), Value::Null);
        assert_eq!(node.style("ease"), Value::Null);
    }

    #[test]
    fn test_animate_never_retracts() {
        let (target, element, node) = setup();
        element.match_all(NARROW).animate(map! { "left" => "10px" }, None);
        assert_eq!(node.style("left"), Value::Null);

        target.set_matches(NARROW, true);
        assert_eq!(node.style("left"), Value::from("10px"));
        target.set_matches(NARROW, false);
        assert_eq!(node.style("left"), Value::from("10px"));
    }

    #[test]
    fn test_append_and_detach_emit_notifications() {
        let (target, parent, parent_node) = setup();
        let child = Element::new(target.clone());
        child.create("span", Some("label"));
        let child_node = child.node().expect("child node");

        parent.append(&child);
        let headless_parent = HeadlessNode::downcast(&parent_node).expect("headless");
        let headless_child = HeadlessNode::downcast(&child_node).expect("headless");
        assert_eq!(headless_parent.children().len(), 1);
        assert_eq!(
            headless_child.dispatched().last().map(|e| e.name.clone()),
            Some("append".to_string())
        );

        parent.detach(&child);
        assert!(headless_parent.children().is_empty());
        assert_eq!(
            headless_child.dispatched().last().map(|e| e.name.clone()),
            Some("remove".to_string())
        );
    }

    #[test]
    fn test_position_walks_offset_parents() {
        let (target, element, node) = setup();
        let parent = target.create_node("section");
        HeadlessNode::downcast(&parent)
            .expect("headless")
            .set_geometry(NodeGeometry {
                offset_left: 100.0,
                offset_top: 50.0,
                scroll_top: 20.0,
                client_left: 1.0,
                client_top: 1.0,
                ..Default::default()
            });

        let headless = HeadlessNode::downcast(&node).expect("headless");
        headless.set_geometry(NodeGeometry {
            offset_left: 10.0,
            offset_top: 5.0,
            offset_width: 200.0,
            offset_height: 80.0,
            ..Default::default()
        });
        headless.set_offset_parent(Some(parent));

        assert_eq!(element.position(), Position { x: 111.0, y: 36.0 });
        assert_eq!(
            element.dimensions(),
            Dimensions {
                width: 200.0,
                height: 80.0
            }
        );
    }

    #[test]
    fn test_destroy_tears_down_subscriptions() {
        let (target, element, node) = setup();
        let mut listeners = ListenerMap::new();
        listeners.insert("click".to_string(), handler(|_| {}));
        element.listen(listeners, None);
        element.match_all(NARROW).style(map! { "color" => "red" });

        let parent = target.create_node("body");
        parent.append_child(&node);

        let query = target.media_query(NARROW);
        assert_eq!(query.changed().connection_count(), 1);

        element.destroy();
        let headless = HeadlessNode::downcast(&node).expect("headless");
        assert_eq!(headless.dispatched().first().map(|e| e.name.as_str()), Some("destroy"));
        assert_eq!(headless.listener_count("click"), 0);
        assert_eq!(query.changed().connection_count(), 0);
        assert!(headless.parent().is_none());
        assert!(element.node().is_none());
        assert!(element.is_destroyed());

        target.set_matches(NARROW, true);
        assert_eq!(node.style("color"), Value::Null);
    }

    #[test]
    fn test_destroy_from_destroy_listener_runs_once() {
        let (_, element, node) = setup();
        let weak = element.downgrade();
        let mut listeners = ListenerMap::new();
        listeners.insert(
            "destroy".to_string(),
            handler(move |_| {
                if let Some(element) = weak.upgrade() {
                    element.destroy();
                }
            }),
        );
        element.listen(listeners, None);

        element.destroy();
        let headless = HeadlessNode::downcast(&node).expect("headless");
        let destroys = headless
            .dispatched()
            .iter()
            .filter(|event| event.name == "destroy")
            .count();
        assert_eq!(destroys, 1);
        assert!(element.is_destroyed());
        assert!(element.node().is_none());
    }

    #[test]
    fn test_ungated_definitions_stay_bounded() {
        let (_, element, node) = setup();
        for i in 0..1000 {
            element.style(map! { "color" => i });
        }
        assert_eq!(node.style("color"), Value::from(999));

        let state = element.inner.state.lock();
        assert_eq!(state.definitions.len(), 0);
        assert_eq!(state.styles.claim_count("color"), 1);
    }

    #[test]
    fn test_ungated_value_restored_after_gated_retract() {
        let (target, element, node) = setup();
        element.style(map! { "color" => "red" });
        element.match_query(NARROW).style(map! { "color" => "blue" });
        element.style(map! { "color" => "green" });

        target.set_matches(NARROW, true);
        assert_eq!(node.style("color"), Value::from("blue"));
        target.set_matches(NARROW, false);
        assert_eq!(node.style("color"), Value::from("green"));
        assert_eq!(element.inner.state.lock().definitions.len(), 1);
    }

    #[test]
    fn test_when_false_skips_next_call_only() {
        let (_, element, node) = setup();
        element.when(false).style(map! { "color" => "red" });
        assert_eq!(node.style("color"), Value::Null);
        assert_eq!(element.style_owner("color"), None);

        element.style(map! { "color" => "blue" });
        assert_eq!(node.style("color"), Value::from("blue"));

        element.when(true).properties(map! { "title" => "shown" });
        assert_eq!(node.property("title"), Value::from("shown"));
    }

    #[test]
    fn test_when_false_leaves_one_shot_matcher_armed() {
        let (target, element, node) = setup();
        element.match_query(NARROW);
        element.when(false).style(map! { "width" => "10px" });
        assert!(element.armed().is_some_and(|m| !m.is_persistent()));
        assert_eq!(element.matcher_count(), 0);

        element.style(map! { "width" => "100%" });
        assert!(element.armed().is_none());
        assert_eq!(element.matcher_count(), 1);

        target.set_matches(NARROW, true);
        assert_eq!(node.style("width"), Value::from("100%"));
    }
}

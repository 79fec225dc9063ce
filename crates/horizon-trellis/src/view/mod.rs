//! Views: the nodes of the composition tree.
//!
//! A [`View`] owns three id-keyed registries (child views, elements and
//! model adapters), a table of local options and at most one timeline. It
//! moves through a fixed lifecycle:
//!
//! 1. *constructed* by a provider registered with the
//!    [`Dispatcher`](crate::Dispatcher),
//! 2. *wired* with the dispatcher (and its timeline and i18n services) on
//!    first retrieval,
//! 3. *built* exactly once through [`ViewBehavior::build`],
//! 4. *active*, rendering and registering children,
//! 5. *destroyed* by [`View::destroy`], which cascades depth-first through
//!    everything the view owns.
//!
//! Children hold only a weak back-reference to their parent, used to leave
//! the parent's registry on destroy.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::prelude::*;
//! use horizon_trellis::headless::HeadlessTarget;
//!
//! let dispatcher = Dispatcher::builder(HeadlessTarget::new())
//!     .view("page", || View::new(()))
//!     .view("menu", || View::new(()))
//!     .build();
//!
//! let page = dispatcher.get("page").unwrap();
//! let menu = page.view(Some("menu"), "menu").unwrap();
//! assert!(menu.parent().is_some_and(|p| p.ptr_eq(&page)));
//!
//! page.destroy();
//! assert!(!page.has_view("menu"));
//! ```

mod behavior;
mod registry;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_trellis_core::{ChildKind, ConnectionGuard, Error, Map, Result, Value};
use parking_lot::Mutex;

use crate::dispatcher::Dispatcher;
use crate::element::Element;
use crate::logging::targets;
use crate::model::Model;
use crate::services::Router;
use crate::timeline::{CompletionHandler, Timeline};

pub use behavior::ViewBehavior;

use registry::Registry;

struct ViewState {
    name: Option<String>,
    parent: Option<WeakView>,
    views: Registry<View>,
    elements: Registry<Element>,
    models: Registry<Model>,
    options: Map,
    timeline: Option<Arc<dyn Timeline>>,
    dispatcher: Option<Dispatcher>,
    i18n: Vec<ConnectionGuard<String>>,
}

impl ViewState {
    fn new() -> Self {
        Self {
            name: None,
            parent: None,
            views: Registry::new(ChildKind::View),
            elements: Registry::new(ChildKind::Element),
            models: Registry::new(ChildKind::Model),
            options: Map::new(),
            timeline: None,
            dispatcher: None,
            i18n: Vec::new(),
        }
    }
}

struct ViewInner {
    behavior: Box<dyn ViewBehavior>,
    state: Mutex<ViewState>,
    destroyed: AtomicBool,
}

/// A node of the composition tree.
///
/// `View` is a cheap handle; clones refer to the same view.
#[derive(Clone)]
pub struct View {
    inner: Arc<ViewInner>,
}

/// Non-owning view handle.
#[derive(Clone, Default)]
pub struct WeakView(Weak<ViewInner>);

impl WeakView {
    pub fn upgrade(&self) -> Option<View> {
        self.0.upgrade().map(|inner| View { inner })
    }
}

impl fmt::Debug for WeakView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakView")
    }
}

impl View {
    /// Construct a bare, unwired view with the given hooks.
    pub fn new(behavior: impl ViewBehavior) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                behavior: Box::new(behavior),
                state: Mutex::new(ViewState::new()),
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    /// The registry name this view was resolved under.
    pub fn name(&self) -> Option<String> {
        self.inner.state.lock().name.clone()
    }

    pub fn parent(&self) -> Option<View> {
        self.inner.state.lock().parent.as_ref().and_then(WeakView::upgrade)
    }

    pub fn dispatcher(&self) -> Option<Dispatcher> {
        self.inner.state.lock().dispatcher.clone()
    }

    pub fn is_wired(&self) -> bool {
        self.inner.state.lock().dispatcher.is_some()
    }

    pub fn timeline(&self) -> Option<Arc<dyn Timeline>> {
        self.inner.state.lock().timeline.clone()
    }

    /// Assign the view's timeline. The timeline is paused on assignment.
    pub fn set_timeline(&self, timeline: Arc<dyn Timeline>) -> &Self {
        timeline.pause();
        self.inner.state.lock().timeline = Some(timeline);
        self
    }

    /// Wire the view to `dispatcher` and run its one-time build hook.
    #[tracing::instrument(skip(self, dispatcher, timeline), target = "horizon_trellis::view", level = "trace")]
    pub(crate) fn wire(&self, name: &str, dispatcher: &Dispatcher, timeline: Option<Arc<dyn Timeline>>) {
        if let Some(timeline) = timeline {
            self.set_timeline(timeline);
        }

        let mut guards = Vec::new();
        if let Some(i18n) = dispatcher.i18n_service() {
            let weak = self.downgrade();
            guards.push(i18n.locale_changed().connect_scoped(move |locale| {
                if let Some(view) = weak.upgrade().filter(|v| !v.is_destroyed()) {
                    view.inner.behavior.locale_changed(&view, locale);
                }
            }));
            let weak = self.downgrade();
            guards.push(i18n.timezone_changed().connect_scoped(move |timezone| {
                if let Some(view) = weak.upgrade().filter(|v| !v.is_destroyed()) {
                    view.inner.behavior.timezone_changed(&view, timezone);
                }
            }));
        }

        {
            let mut state = self.inner.state.lock();
            state.name = Some(name.to_string());
            state.dispatcher = Some(dispatcher.clone());
            state.i18n = guards;
        }
        self.inner.destroyed.store(false, Ordering::SeqCst);

        tracing::debug!(target: targets::VIEW, name, "view wired, building");
        self.inner.behavior.build(self);
    }

    /// Run the render hook.
    pub fn render(&self) -> Option<Element> {
        self.inner.behavior.render(self)
    }

    /// Resolve the named view through the dispatcher and, with `id`,
    /// register it as a child.
    ///
    /// The resolved view's parent is set to `self` only if it has none yet.
    /// Without an `id` the view is returned unregistered and the caller owns
    /// its lifecycle.
    pub fn view(&self, id: Option<&str>, name: &str) -> Result<View> {
        if let Some(id) = id {
            self.inner.state.lock().views.check_vacant(id)?;
        }

        let dispatcher = self.dispatcher().ok_or(Error::service_unavailable("dispatcher"))?;
        let child = dispatcher.get(name)?;

        {
            let mut child_state = child.inner.state.lock();
            if child_state.parent.is_none() {
                child_state.parent = Some(self.downgrade());
            }
        }

        if let Some(id) = id {
            self.inner.state.lock().views.insert(id, child.clone())?;
        }
        Ok(child)
    }

    pub fn get_view(&self, id: &str) -> Option<View> {
        self.inner.state.lock().views.get(id)
    }

    pub fn has_view(&self, id: &str) -> bool {
        self.inner.state.lock().views.contains(id)
    }

    /// Detach and return a child view without destroying it.
    pub fn remove_view(&self, id: &str) -> Option<View> {
        self.inner.state.lock().views.remove(id)
    }

    /// Detach `view` from the child registry by identity.
    pub fn remove_view_object(&self, view: &View) -> Option<View> {
        self.inner
            .state
            .lock()
            .views
            .remove_where(|child| child.ptr_eq(view))
            .map(|(_, child)| child)
    }

    /// Resolve a dot-separated chain of child ids.
    ///
    /// An empty path resolves to `self`.
    pub fn find(&self, path: &str) -> Option<View> {
        if path.is_empty() {
            return Some(self.clone());
        }
        path.split('.')
            .try_fold(self.clone(), |view, id| view.get_view(id))
    }

    /// Create a fresh element of type `kind` owned by this view and, with
    /// `id`, register it.
    pub fn element(&self, id: Option<&str>, kind: &str) -> Result<Element> {
        if let Some(id) = id {
            self.inner.state.lock().elements.check_vacant(id)?;
        }

        let dispatcher = self.dispatcher().ok_or(Error::service_unavailable("dispatcher"))?;
        let element = dispatcher.create_element();
        element.set_view(self).create(kind, id);

        if let Some(id) = id {
            self.inner.state.lock().elements.insert(id, element.clone())?;
        }
        Ok(element)
    }

    pub fn get_element(&self, id: &str) -> Option<Element> {
        self.inner.state.lock().elements.get(id)
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.inner.state.lock().elements.contains(id)
    }

    /// Detach and return an element without destroying it.
    pub fn remove_element(&self, id: &str) -> Option<Element> {
        self.inner.state.lock().elements.remove(id)
    }

    pub(crate) fn detach_element(&self, element: &Element) {
        self.inner
            .state
            .lock()
            .elements
            .remove_where(|candidate| candidate.ptr_eq(element));
    }

    /// Create a fresh model adapter over the data source `name` and, with
    /// `id`, register it.
    pub fn model(&self, id: Option<&str>, name: &str) -> Result<Model> {
        if let Some(id) = id {
            self.inner.state.lock().models.check_vacant(id)?;
        }

        let dispatcher = self.dispatcher().ok_or(Error::service_unavailable("dispatcher"))?;
        let model = dispatcher.model(name)?;

        if let Some(id) = id {
            self.inner.state.lock().models.insert(id, model.clone())?;
        }
        Ok(model)
    }

    pub fn get_model(&self, id: &str) -> Option<Model> {
        self.inner.state.lock().models.get(id)
    }

    pub fn has_model(&self, id: &str) -> bool {
        self.inner.state.lock().models.contains(id)
    }

    /// Detach and return a model adapter without unlistening it.
    pub fn remove_model(&self, id: &str) -> Option<Model> {
        self.inner.state.lock().models.remove(id)
    }

    pub fn view_ids(&self) -> Vec<String> {
        self.inner.state.lock().views.ids()
    }

    pub fn element_ids(&self) -> Vec<String> {
        self.inner.state.lock().elements.ids()
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.inner.state.lock().models.ids()
    }

    /// Registered child views in registration order.
    pub fn children(&self) -> Vec<(String, View)> {
        self.inner.state.lock().views.entries()
    }

    /// Local option overrides.
    pub fn options(&self) -> Map {
        self.inner.state.lock().options.clone()
    }

    /// Merge `options` into the local overrides.
    pub fn set_options(&self, options: Map) -> &Self {
        self.inner.state.lock().options.extend(options);
        self
    }

    pub fn set_option(&self, name: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner
            .state
            .lock()
            .options
            .insert(name.into(), value.into());
        self
    }

    /// Look up an option: local override first, then the dispatcher default.
    pub fn option(&self, name: &str) -> Option<Value> {
        let (local, dispatcher) = {
            let state = self.inner.state.lock();
            (state.options.get(name).cloned(), state.dispatcher.clone())
        };
        local.or_else(|| dispatcher.and_then(|d| d.option(name)))
    }

    /// Start the timeline.
    ///
    /// On completion the view is [`clear`](View::clear)ed and `on_complete`
    /// runs. Without a timeline nothing happens and `on_complete` is dropped.
    pub fn play(&self, on_complete: Option<CompletionHandler>) -> &Self {
        let Some(timeline) = self.timeline() else {
            return self;
        };

        let weak = self.downgrade();
        timeline.set_on_complete(Some(Box::new(move || {
            match weak.upgrade().filter(|view| !view.is_destroyed()) {
                Some(view) => {
                    view.clear(on_complete);
                }
                None => tracing::trace!(target: targets::VIEW, "dropping completion after destroy"),
            }
        })));
        timeline.play();
        self
    }

    /// Reset the timeline: drop the completion handler, pause, remove the
    /// tweens and rewind to zero. Then run `on_complete`.
    pub fn clear(&self, on_complete: Option<CompletionHandler>) -> &Self {
        if let Some(timeline) = self.timeline() {
            timeline.set_on_complete(None);
            timeline.pause();
            timeline.clear();
            timeline.seek(0.0);
        }
        if let Some(callback) = on_complete {
            callback();
        }
        self
    }

    /// Test a capability. Fails closed when no tester is wired.
    pub fn capability(&self, name: &str) -> bool {
        self.dispatcher().is_some_and(|d| d.capability(name))
    }

    /// Localized lookup through the i18n service.
    pub fn i18n(&self, name: &str) -> Option<String> {
        self.dispatcher().and_then(|d| d.i18n(name))
    }

    /// Draw the next id from the dispatcher counter.
    pub fn count(&self, prefix: Option<&str>) -> Option<String> {
        self.dispatcher().map(|d| d.count(prefix))
    }

    pub fn router(&self) -> Option<Arc<dyn Router>> {
        self.dispatcher().and_then(|d| d.router())
    }

    /// Tear down the view and everything it owns.
    ///
    /// Child views are destroyed first (depth-first), then elements; model
    /// adapters are unlistened only. The view then leaves its parent's
    /// registry and drops its dispatcher reference. A second call is a
    /// no-op.
    #[tracing::instrument(skip(self), target = "horizon_trellis::view", level = "trace")]
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            tracing::trace!(target: targets::VIEW, "view already destroyed");
            return;
        }

        let (views, elements, models, i18n, timeline, parent) = {
            let mut state = self.inner.state.lock();
            (
                state.views.drain(),
                state.elements.drain(),
                state.models.drain(),
                std::mem::take(&mut state.i18n),
                state.timeline.clone(),
                state.parent.clone(),
            )
        };

        tracing::debug!(
            target: targets::VIEW,
            name = ?self.name(),
            views = views.len(),
            elements = elements.len(),
            models = models.len(),
            "destroying view"
        );

        for (_, view) in views {
            view.destroy();
        }
        for (_, element) in elements {
            element.destroy();
        }
        for (_, model) in models {
            model.unlisten();
        }
        drop(i18n);

        if let Some(timeline) = timeline {
            timeline.set_on_complete(None);
            timeline.clear();
        }

        if let Some(parent) = parent.as_ref().and_then(WeakView::upgrade) {
            parent.remove_view_object(self);
        }

        let mut state = self.inner.state.lock();
        state.parent = None;
        state.dispatcher = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    pub fn downgrade(&self) -> WeakView {
        WeakView(Arc::downgrade(&self.inner))
    }

    /// Compare two handles by identity.
    pub fn ptr_eq(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("View")
            .field("name", &state.name)
            .field("views", &state.views.ids())
            .field("elements", &state.elements.ids())
            .field("models", &state.models.ids())
            .field("wired", &state.dispatcher.is_some())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

static_assertions::assert_impl_all!(View: Send, Sync);
static_assertions::assert_impl_all!(WeakView: Send, Sync);

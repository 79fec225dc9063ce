//! The named-view factory and registry.
//!
//! A [`Dispatcher`] holds one provider per view name. Two kinds of product
//! come out of it, and the difference is part of the API:
//!
//! - **Singletons**: [`Dispatcher::get`] constructs the view for a name once,
//!   wires it on first retrieval and returns the same instance afterwards.
//! - **Transients**: [`Dispatcher::create_element`] and [`Dispatcher::model`]
//!   return a fresh instance on every call.
//!
//! The dispatcher also carries the collaborators every view reaches through
//! it: the render target, the timeline provider, the data-source factory,
//! and the i18n, capability and router services.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use horizon_trellis_core::{Error, Map, Result, Value};
use parking_lot::Mutex;

use crate::config::DispatcherConfig;
use crate::element::Element;
use crate::logging::targets;
use crate::model::{DataSource, DataSourceFactory, Model};
use crate::render::RenderTarget;
use crate::services::{CapabilityTester, I18n, Router};
use crate::timeline::{Timeline, TimelineProvider};
use crate::view::View;

/// Constructs the singleton view for one name.
pub type ViewProvider = Arc<dyn Fn() -> View + Send + Sync>;

struct ViewEntry {
    provider: ViewProvider,
    instance: Option<View>,
}

#[derive(Default)]
struct Services {
    timelines: Option<TimelineProvider>,
    data_sources: Option<DataSourceFactory>,
    i18n: Option<Arc<dyn I18n>>,
    capabilities: Option<Arc<dyn CapabilityTester>>,
    router: Option<Arc<dyn Router>>,
}

struct DispatcherState {
    views: HashMap<String, ViewEntry>,
    config: DispatcherConfig,
}

struct DispatcherInner {
    target: Arc<dyn RenderTarget>,
    services: Services,
    state: Mutex<DispatcherState>,
    counter: AtomicU64,
}

/// Builder for creating a [`Dispatcher`].
pub struct DispatcherBuilder {
    target: Arc<dyn RenderTarget>,
    views: Vec<(String, ViewProvider)>,
    services: Services,
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Start a builder rendering into `target`.
    pub fn new(target: Arc<dyn RenderTarget>) -> Self {
        Self {
            target,
            views: Vec::new(),
            services: Services::default(),
            config: DispatcherConfig::default(),
        }
    }

    /// Register a view provider.
    pub fn view<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn() -> View + Send + Sync + 'static,
    {
        self.views.push((name.into(), Arc::new(provider)));
        self
    }

    /// Give every wired view a fresh timeline from `provider`.
    pub fn timeline<F, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
        T: Timeline + 'static,
    {
        self.services.timelines = Some(Arc::new(move || provider() as Arc<dyn Timeline>));
        self
    }

    /// Back model adapters with data sources from `factory`.
    pub fn data_sources<F, S>(mut self, factory: F) -> Self
    where
        F: Fn() -> Arc<S> + Send + Sync + 'static,
        S: DataSource + 'static,
    {
        self.services.data_sources = Some(Arc::new(move || factory() as Arc<dyn DataSource>));
        self
    }

    pub fn i18n(mut self, i18n: Arc<dyn I18n>) -> Self {
        self.services.i18n = Some(i18n);
        self
    }

    pub fn capabilities(mut self, tester: Arc<dyn CapabilityTester>) -> Self {
        self.services.capabilities = Some(tester);
        self
    }

    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.services.router = Some(router);
        self
    }

    /// Apply configuration (option defaults, animation defaults, id format).
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Dispatcher {
        let views = self
            .views
            .into_iter()
            .map(|(name, provider)| {
                (
                    name,
                    ViewEntry {
                        provider,
                        instance: None,
                    },
                )
            })
            .collect();

        Dispatcher {
            inner: Arc::new(DispatcherInner {
                target: self.target,
                services: self.services,
                state: Mutex::new(DispatcherState {
                    views,
                    config: self.config,
                }),
                counter: AtomicU64::new(0),
            }),
        }
    }
}

/// Named-view factory/registry.
///
/// `Dispatcher` is a cheap handle; clones share the registry.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Start building a dispatcher that renders into `target`.
    pub fn builder(target: Arc<dyn RenderTarget>) -> DispatcherBuilder {
        DispatcherBuilder::new(target)
    }

    /// Resolve the singleton view for `name`.
    ///
    /// On first retrieval the view is constructed, wired (timeline, services,
    /// dispatcher reference) and built. Later calls return the same instance
    /// untouched. Unknown names fail with [`Error::ViewNotFound`] and leave
    /// the registry as it was.
    #[doc(alias = "get_singleton")]
    pub fn get(&self, name: &str) -> Result<View> {
        let (provider, existing) = {
            let state = self.inner.state.lock();
            let entry = state
                .views
                .get(name)
                .ok_or_else(|| Error::view_not_found(name))?;
            (Arc::clone(&entry.provider), entry.instance.clone())
        };

        let view = match existing {
            Some(view) => view,
            None => {
                let constructed = provider();
                let mut state = self.inner.state.lock();
                match state.views.get_mut(name) {
                    Some(entry) => entry.instance.get_or_insert(constructed).clone(),
                    None => return Err(Error::view_not_found(name)),
                }
            }
        };

        if !view.is_wired() {
            tracing::debug!(target: targets::DISPATCHER, name, "wiring view");
            let timeline = self.inner.services.timelines.as_ref().map(|provider| provider());
            view.wire(name, self, timeline);
        }

        Ok(view)
    }

    /// Register providers for additional names. Names already registered keep
    /// their provider and any existing singleton.
    pub fn add_views<I, F>(&self, views: I) -> &Self
    where
        I: IntoIterator<Item = (String, F)>,
        F: Fn() -> View + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        for (name, provider) in views {
            state.views.entry(name).or_insert_with(|| ViewEntry {
                provider: Arc::new(provider),
                instance: None,
            });
        }
        self
    }

    /// Register a single provider, keeping an existing registration.
    pub fn register<F>(&self, name: impl Into<String>, provider: F) -> &Self
    where
        F: Fn() -> View + Send + Sync + 'static,
    {
        self.add_views([(name.into(), provider)])
    }

    /// Whether a provider is registered for `name`.
    pub fn has_view(&self, name: &str) -> bool {
        self.inner.state.lock().views.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn view_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.state.lock().views.keys().cloned().collect();
        names.sort();
        names
    }

    /// The singleton for `name` if it has been constructed.
    pub fn instance(&self, name: &str) -> Option<View> {
        self.inner
            .state
            .lock()
            .views
            .get(name)
            .and_then(|entry| entry.instance.clone())
    }

    /// Dispatcher-level option defaults.
    pub fn options(&self) -> Map {
        self.inner.state.lock().config.options.clone()
    }

    /// Merge `options` into the defaults.
    pub fn set_options(&self, options: Map) -> &Self {
        self.inner.state.lock().config.options.extend(options);
        self
    }

    pub fn option(&self, name: &str) -> Option<Value> {
        self.inner.state.lock().config.options.get(name).cloned()
    }

    /// Replace the configuration. Already-wired views pick the new defaults
    /// up on their next lookup.
    pub fn apply_config(&self, config: DispatcherConfig) -> &Self {
        tracing::debug!(target: targets::DISPATCHER, options = config.options.len(), "applying configuration");
        self.inner.state.lock().config = config;
        self
    }

    pub fn config(&self) -> DispatcherConfig {
        self.inner.state.lock().config.clone()
    }

    pub fn default_duration_ms(&self) -> f64 {
        self.inner.state.lock().config.animation.default_duration_ms
    }

    /// A fresh element on the dispatcher's render target.
    #[doc(alias = "element")]
    pub fn create_element(&self) -> Element {
        Element::new(Arc::clone(&self.inner.target))
    }

    /// A fresh model adapter over a new data source named `name`.
    pub fn model(&self, name: &str) -> Result<Model> {
        let factory = self
            .inner
            .services
            .data_sources
            .as_ref()
            .ok_or(Error::service_unavailable("data source"))?;
        let model = Model::new(factory());
        model.set_name(name);
        Ok(model)
    }

    /// Next value of the id counter, as `"prefix-N"` or `"N"`.
    pub fn count(&self, prefix: Option<&str>) -> String {
        let n = self.inner.counter.fetch_add(1, Ordering::SeqCst) + 1;
        match prefix {
            Some(prefix) => {
                let separator = self.inner.state.lock().config.id_separator.clone();
                format!("{prefix}{separator}{n}")
            }
            None => n.to_string(),
        }
    }

    /// Localized lookup.
    pub fn i18n(&self, name: &str) -> Option<String> {
        self.inner.services.i18n.as_ref().and_then(|i18n| i18n.get(name))
    }

    pub fn i18n_service(&self) -> Option<Arc<dyn I18n>> {
        self.inner.services.i18n.clone()
    }

    /// Test a capability. `false` without a tester.
    pub fn capability(&self, name: &str) -> bool {
        self.inner
            .services
            .capabilities
            .as_ref()
            .is_some_and(|tester| tester.test(name))
    }

    pub fn router(&self) -> Option<Arc<dyn Router>> {
        self.inner.services.router.clone()
    }

    pub fn target(&self) -> Arc<dyn RenderTarget> {
        Arc::clone(&self.inner.target)
    }

    /// Compare two handles by identity.
    pub fn ptr_eq(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("views", &self.view_names())
            .field("counter", &self.inner.counter.load(Ordering::SeqCst))
            .finish()
    }
}

static_assertions::assert_impl_all!(Dispatcher: Send, Sync);

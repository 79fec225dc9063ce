//! The model adapter.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_trellis_core::{ConnectionId, Value};
use parking_lot::Mutex;

use super::source::{DataError, DataEvents, DataSource};
use crate::logging::targets;

type RowCallback = Arc<dyn Fn(&Value) + Send + Sync>;
type BindCallback = Arc<dyn Fn(&[Value]) + Send + Sync>;
type EmptyCallback = Arc<dyn Fn() + Send + Sync>;

/// Where `select` results go.
#[derive(Default, Clone)]
struct ResultCallbacks {
    iterate: Option<RowCallback>,
    bind: Option<BindCallback>,
    empty: Option<EmptyCallback>,
}

struct ModelInner {
    source: Arc<dyn DataSource>,
    events: DataEvents,
    callbacks: Mutex<ResultCallbacks>,
    connections: Mutex<Option<(ConnectionId, ConnectionId)>>,
    unlistened: AtomicBool,
}

/// Forwarding adapter over a [`DataSource`].
///
/// Cloning yields another handle to the same adapter. Dropping the last
/// handle does not unsubscribe; call [`unlisten`](Model::unlisten) (views do
/// this on destroy).
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    /// Wrap `source` and subscribe to its `select` and `error` events.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let events = source.events();
        let model = Self {
            inner: Arc::new(ModelInner {
                source,
                events: events.clone(),
                callbacks: Mutex::new(ResultCallbacks::default()),
                connections: Mutex::new(None),
                unlistened: AtomicBool::new(false),
            }),
        };

        let weak = Arc::downgrade(&model.inner);
        let selected = events.selected.connect(move |rows| {
            if let Some(model) = Self::upgrade(&weak) {
                model.handle_select(rows);
            }
        });
        let weak = Arc::downgrade(&model.inner);
        let failed = events.failed.connect(move |error| {
            if let Some(model) = Self::upgrade(&weak) {
                model.handle_error(error);
            }
        });
        *model.inner.connections.lock() = Some((selected, failed));

        model
    }

    fn upgrade(weak: &Weak<ModelInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// The wrapped data source.
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.inner.source
    }

    /// The data source's name.
    pub fn name(&self) -> Option<String> {
        self.inner.source.name()
    }

    /// Rename the data source.
    pub fn set_name(&self, name: &str) -> &Self {
        self.inner.source.set_name(name);
        self
    }

    /// Invoke `callback` once per result row.
    ///
    /// Replaces any `bind` callback. An `empty` callback set before or after
    /// is kept.
    pub fn iterate<F>(&self, callback: F) -> &Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut callbacks = self.inner.callbacks.lock();
        callbacks.iterate = Some(Arc::new(callback));
        callbacks.bind = None;
        self
    }

    /// Invoke `callback` once with the whole result.
    ///
    /// Replaces any `iterate`/`empty` callbacks.
    pub fn bind<F>(&self, callback: F) -> &Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let mut callbacks = self.inner.callbacks.lock();
        callbacks.bind = Some(Arc::new(callback));
        callbacks.iterate = None;
        callbacks.empty = None;
        self
    }

    /// Invoke `callback` when an iterated result has no rows.
    pub fn empty<F>(&self, callback: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.lock().empty = Some(Arc::new(callback));
        self
    }

    pub fn select(&self, query: &Value) -> &Self {
        self.inner.source.select(query);
        self
    }

    pub fn insert(&self, row: &Value) -> &Self {
        self.inner.source.insert(row);
        self
    }

    pub fn update(&self, row: &Value) -> &Self {
        self.inner.source.update(row);
        self
    }

    pub fn delete(&self, row: &Value) -> &Self {
        self.inner.source.delete(row);
        self
    }

    /// Unsubscribe from the data source. The source itself is left intact.
    pub fn unlisten(&self) {
        self.inner.unlistened.store(true, Ordering::SeqCst);
        if let Some((selected, failed)) = self.inner.connections.lock().take() {
            self.inner.events.selected.disconnect(selected);
            self.inner.events.failed.disconnect(failed);
            tracing::trace!(target: targets::MODEL, name = ?self.name(), "model unlistened");
        }
    }

    /// Whether [`unlisten`](Model::unlisten) has been called.
    pub fn is_listening(&self) -> bool {
        !self.inner.unlistened.load(Ordering::SeqCst)
    }

    /// Compare two handles by identity.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn handle_select(&self, rows: &[Value]) {
        if !self.is_listening() {
            tracing::trace!(target: targets::MODEL, "dropping select result after unlisten");
            return;
        }

        let callbacks = self.inner.callbacks.lock().clone();
        if let Some(each) = callbacks.iterate {
            if rows.is_empty() {
                if let Some(empty) = callbacks.empty {
                    empty();
                }
                return;
            }
            for row in rows {
                each(row);
            }
        } else if let Some(bind) = callbacks.bind {
            bind(rows);
        }
    }

    fn handle_error(&self, error: &DataError) {
        tracing::warn!(
            target: targets::MODEL,
            name = ?self.name(),
            detail = ?error.detail,
            "data source error: {error}"
        );
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("listening", &self.is_listening())
            .finish()
    }
}

static_assertions::assert_impl_all!(Model: Send, Sync);

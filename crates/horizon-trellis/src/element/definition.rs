//! Definitions: what an element call applies.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use horizon_trellis_core::Map;
use slotmap::new_key_type;

use super::Element;
use crate::render::EventHandler;

new_key_type! {
    /// Opaque handle identifying one `properties`/`style`/`listen`/`animate`
    /// call on an element.
    ///
    /// History ownership is tracked by this handle, never by comparing the
    /// caller's definition values.
    pub struct DefinitionId;
}

/// Event name → handler mapping used by `listen`.
pub type ListenerMap = BTreeMap<String, EventHandler>;

/// A literal mapping, or a function producing one at apply time.
///
/// Lazy definitions are evaluated against the element every time their gate
/// is checked, so they can read element state (data, geometry) that changed
/// since the call was made.
pub enum Definition<T> {
    Literal(T),
    Lazy(Arc<dyn Fn(&Element) -> T + Send + Sync>),
}

impl<T> Definition<T> {
    /// Wrap a function evaluated at apply time.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn(&Element) -> T + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(f))
    }
}

impl<T: Clone> Definition<T> {
    pub(crate) fn resolve(&self, element: &Element) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Lazy(f) => f(element),
        }
    }
}

impl<T: Clone> Clone for Definition<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Lazy(f) => Self::Lazy(Arc::clone(f)),
        }
    }
}

impl<T> From<T> for Definition<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for Definition<Map> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(map) => f.debug_tuple("Literal").field(map).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl fmt::Debug for Definition<ListenerMap> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(map) => f
                .debug_tuple("Literal")
                .field(&map.keys().collect::<Vec<_>>())
                .finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

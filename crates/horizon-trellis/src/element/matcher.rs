//! Matchers gate definitions on a predicate.

use std::fmt;
use std::sync::Arc;

use horizon_trellis_core::ConnectionId;

use crate::render::MediaQuery;

/// An armed predicate waiting to be consumed by the next definition call.
#[derive(Clone)]
pub enum Matcher {
    /// Gates exactly one definition call, then disarms.
    OneShot(Arc<dyn MediaQuery>),
    /// Stays armed and gates every following definition call.
    Persistent(Arc<dyn MediaQuery>),
}

impl Matcher {
    /// The underlying predicate.
    pub fn query(&self) -> &Arc<dyn MediaQuery> {
        match self {
            Self::OneShot(query) | Self::Persistent(query) => query,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    /// Current truth value of the predicate.
    pub fn matches(&self) -> bool {
        self.query().matches()
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = if self.is_persistent() {
            "Persistent"
        } else {
            "OneShot"
        };
        f.debug_tuple(variant).field(&self.query().query()).finish()
    }
}

/// A live subscription of one definition to a predicate's change signal.
pub(crate) struct MatcherBinding {
    query: Arc<dyn MediaQuery>,
    connection: ConnectionId,
}

impl MatcherBinding {
    pub(crate) fn new(query: Arc<dyn MediaQuery>, connection: ConnectionId) -> Self {
        Self { query, connection }
    }

    pub(crate) fn unbind(self) {
        self.query.changed().disconnect(self.connection);
    }
}

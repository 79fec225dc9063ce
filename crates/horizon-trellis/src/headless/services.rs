//! Static i18n, capability and router services.

use std::collections::{HashMap, HashSet};

use horizon_trellis_core::Signal;
use parking_lot::Mutex;

use crate::services::{CapabilityTester, I18n, Router};

/// A message table with manually triggered locale/timezone switches.
#[derive(Debug, Default)]
pub struct StaticI18n {
    messages: Mutex<HashMap<String, String>>,
    locale_changed: Signal<String>,
    timezone_changed: Signal<String>,
}

impl StaticI18n {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message.
    pub fn with(self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(name, message);
        self
    }

    pub fn insert(&self, name: impl Into<String>, message: impl Into<String>) {
        self.messages.lock().insert(name.into(), message.into());
    }

    /// Announce a locale switch.
    pub fn set_locale(&self, locale: &str) {
        self.locale_changed.emit(locale.to_string());
    }

    /// Announce a timezone switch.
    pub fn set_timezone(&self, timezone: &str) {
        self.timezone_changed.emit(timezone.to_string());
    }
}

impl I18n for StaticI18n {
    fn get(&self, name: &str) -> Option<String> {
        self.messages.lock().get(name).cloned()
    }

    fn locale_changed(&self) -> Signal<String> {
        self.locale_changed.clone()
    }

    fn timezone_changed(&self) -> Signal<String> {
        self.timezone_changed.clone()
    }
}

/// Grants a fixed set of capabilities.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    granted: HashSet<String>,
}

impl StaticCapabilities {
    pub fn granting<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl CapabilityTester for StaticCapabilities {
    fn test(&self, name: &str) -> bool {
        self.granted.contains(name)
    }
}

/// Remembers every route it was asked to navigate to.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    history: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Router for MemoryRouter {
    fn navigate(&self, route: &str) {
        self.history.lock().push(route.to_string());
    }

    fn current(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

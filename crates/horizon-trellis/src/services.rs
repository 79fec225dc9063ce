//! Collaborator services wired into every view.
//!
//! These are consumed only through their contracts; permission evaluation,
//! message catalogs and routing live outside this crate.

use horizon_trellis_core::Signal;

/// Answers whether a named capability is granted.
pub trait CapabilityTester: Send + Sync {
    fn test(&self, name: &str) -> bool;
}

/// Localized content lookup plus locale/timezone change notifications.
pub trait I18n: Send + Sync {
    /// Look up the localized value for `name`.
    fn get(&self, name: &str) -> Option<String>;

    /// Emits the new locale identifier when it changes.
    fn locale_changed(&self) -> Signal<String>;

    /// Emits the new timezone identifier when it changes.
    fn timezone_changed(&self) -> Signal<String>;
}

/// Application router handle.
pub trait Router: Send + Sync {
    fn navigate(&self, route: &str);
    fn current(&self) -> Option<String>;
}

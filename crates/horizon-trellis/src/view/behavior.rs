//! Application hooks attached to a view.

use crate::element::Element;

use super::View;

/// Hooks a view calls at fixed points of its lifecycle.
///
/// Every method has a no-op default, so an implementation only overrides
/// what it needs. The unit type `()` is the behavior of a bare view.
///
/// # Example
///
/// ```
/// use horizon_trellis::element::Element;
/// use horizon_trellis::view::{View, ViewBehavior};
///
/// struct Header;
///
/// impl ViewBehavior for Header {
///     fn render(&self, view: &View) -> Option<Element> {
///         let root = view.element(Some("root"), "header").ok()?;
///         Some(root)
///     }
/// }
/// ```
pub trait ViewBehavior: Send + Sync + 'static {
    /// Called exactly once, right after the view is wired by the dispatcher.
    fn build(&self, _view: &View) {}

    /// Produce the view's root element. Called by the owner, not the
    /// framework; may be called more than once.
    fn render(&self, _view: &View) -> Option<Element> {
        None
    }

    /// The i18n service switched locale.
    fn locale_changed(&self, _view: &View, _locale: &str) {}

    /// The i18n service switched timezone.
    fn timezone_changed(&self, _view: &View, _timezone: &str) {}
}

impl ViewBehavior for () {}

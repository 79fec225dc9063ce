//! Timeline contract for view animations.
//!
//! A view owns at most one [`Timeline`], created by the dispatcher's
//! timeline provider at wiring time and always paused on assignment.
//! Element `animate` calls add tweens to it; [`View::play`](crate::View::play)
//! drives it. Times are in seconds, the timeline's native unit.

mod easing;

use std::fmt;
use std::sync::Arc;

use horizon_trellis_core::Map;

use crate::render::NodeRef;

pub use easing::{Ease, Easing};

/// One-shot completion callback.
pub type CompletionHandler = Box<dyn FnOnce() + Send + 'static>;

/// Produces a fresh timeline for a newly wired view.
pub type TimelineProvider = Arc<dyn Fn() -> Arc<dyn Timeline> + Send + Sync>;

/// Start and length of a tween already on a timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpan {
    pub start: f64,
    pub duration: f64,
}

impl TweenSpan {
    /// The time at which the tween finishes.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A request to tween `node` towards `properties`.
pub struct Tween {
    pub node: NodeRef,
    /// Duration in seconds.
    pub duration: f64,
    /// Target values, with animation meta-fields already stripped.
    pub properties: Map,
    /// Absolute start offset in seconds; `None` appends at the end.
    pub position: Option<f64>,
    pub ease: Option<Ease>,
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("node", &self.node.kind())
            .field("duration", &self.duration)
            .field("properties", &self.properties)
            .field("position", &self.position)
            .field("ease", &self.ease)
            .finish()
    }
}

/// The animation-sequencing collaborator.
///
/// Implementations must not hold internal locks while invoking the
/// completion handler: the handler re-enters the timeline through
/// [`View::clear`](crate::View::clear).
pub trait Timeline: Send + Sync {
    fn play(&self);
    fn pause(&self);

    /// Remove all tweens.
    fn clear(&self);

    /// Move the playhead to `time` seconds.
    fn seek(&self, time: f64);

    fn set_repeat(&self, count: i32);

    /// Add a tween.
    fn to(&self, tween: Tween);

    /// Total duration in seconds.
    fn duration(&self) -> f64;

    /// Span of the most recently added tween.
    fn recent(&self) -> Option<TweenSpan>;

    /// Register (or with `None`, clear) the completion handler.
    fn set_on_complete(&self, handler: Option<CompletionHandler>);
}

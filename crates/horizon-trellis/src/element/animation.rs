//! Animation meta-fields.
//!
//! An animation definition is a property map in which a handful of reserved
//! keys steer the tween instead of being animated:
//!
//! | key          | meaning                                                   |
//! |--------------|-----------------------------------------------------------|
//! | `play`       | start the timeline after adding the tween                 |
//! | `duration`   | milliseconds (default from configuration, 150)            |
//! | `position`   | explicit start offset in seconds                          |
//! | `stagger`    | milliseconds after the end of the most recent tween       |
//! | `ease`       | named easing curve                                        |
//! | `easeConfig` | numeric parameters for the curve                          |
//! | `repeat`     | repeat count for the whole timeline                       |

use horizon_trellis_core::{Map, Value};

use crate::logging::targets;
use crate::timeline::{Ease, Easing, Timeline};

/// Default tween duration when neither the definition nor the configuration
/// specifies one.
pub const DEFAULT_DURATION_MS: f64 = 150.0;

/// Meta-fields extracted from an animation definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationOptions {
    pub play: bool,
    pub duration_ms: f64,
    pub position: Option<f64>,
    pub stagger_ms: Option<f64>,
    pub ease: Option<Ease>,
    pub repeat: Option<i32>,
}

impl AnimationOptions {
    /// Strip the reserved keys from `properties` and parse them.
    pub fn extract(properties: &mut Map, default_duration_ms: f64) -> Self {
        let play = properties.remove("play").is_some_and(|v| v.is_truthy());
        let duration_ms = properties
            .remove("duration")
            .and_then(|v| v.as_f64())
            .unwrap_or(default_duration_ms);
        let position = properties.remove("position").and_then(|v| v.as_f64());
        let stagger_ms = properties.remove("stagger").and_then(|v| v.as_f64());
        let repeat = properties
            .remove("repeat")
            .and_then(|v| v.as_integer())
            .filter(|count| *count != 0)
            .and_then(|count| i32::try_from(count).ok());

        let ease_config = properties.remove("easeConfig");
        let ease = properties
            .remove("ease")
            .and_then(|name| resolve_ease(&name))
            .map(|ease| match ease_config.as_ref().and_then(Value::as_array) {
                Some(params) => ease.configured(params.iter().filter_map(Value::as_f64)),
                None => ease,
            });

        Self {
            play,
            duration_ms,
            position,
            stagger_ms,
            ease,
            repeat,
        }
    }

    /// Tween duration in the timeline's unit (seconds).
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms / 1000.0
    }

    /// Start offset for a tween about to be added to `timeline`.
    ///
    /// A stagger on a non-empty timeline wins over an explicit position.
    pub fn start_offset(&self, timeline: &dyn Timeline) -> Option<f64> {
        if let Some(stagger) = self.stagger_ms {
            if timeline.duration() > 0.0 {
                if let Some(recent) = timeline.recent() {
                    return Some(recent.end() + stagger / 1000.0);
                }
            }
        }
        self.position
    }
}

fn resolve_ease(name: &Value) -> Option<Ease> {
    let name = name.as_str()?;
    match Easing::find(name) {
        Some(easing) => Some(Ease::new(easing)),
        None => {
            tracing::warn!(target: targets::ELEMENT, ease = name, "unknown ease, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessTimeline;
    use crate::timeline::Tween;
    use horizon_trellis_core::map;

    #[test]
    fn test_extract_strips_meta_fields() {
        let mut props = map! {
            "opacity" => 1,
            "play" => true,
            "duration" => 300,
            "position" => 0.25,
            "ease" => "easeOut",
            "easeConfig" => vec![1.5],
            "repeat" => 2,
        };
        let options = AnimationOptions::extract(&mut props, DEFAULT_DURATION_MS);

        assert_eq!(props, map! { "opacity" => 1 });
        assert!(options.play);
        assert_eq!(options.duration_secs(), 0.3);
        assert_eq!(options.position, Some(0.25));
        assert_eq!(options.repeat, Some(2));
        assert_eq!(
            options.ease,
            Some(Ease::new(Easing::EaseOut).configured([1.5]))
        );
    }

    #[test]
    fn test_default_duration() {
        let mut props = map! { "left" => "10px" };
        let options = AnimationOptions::extract(&mut props, DEFAULT_DURATION_MS);
        assert_eq!(options.duration_ms, 150.0);
        assert!(!options.play);
        assert!(options.ease.is_none());
    }

    #[test]
    fn test_unknown_ease_is_dropped() {
        let mut props = map! { "ease" => "wobble", "top" => 0 };
        let options = AnimationOptions::extract(&mut props, DEFAULT_DURATION_MS);
        assert!(options.ease.is_none());
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_stagger_follows_most_recent_tween() {
        let timeline = HeadlessTimeline::new();
        timeline.to(Tween {
            node: crate::headless::HeadlessNode::detached("div"),
            duration: 0.5,
            properties: Map::new(),
            position: Some(0.0),
            ease: None,
        });

        let mut props = map! { "duration" => 300, "stagger" => 100 };
        let options = AnimationOptions::extract(&mut props, DEFAULT_DURATION_MS);
        let offset = options.start_offset(&timeline).expect("staggered offset");
        assert!((offset - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_stagger_on_empty_timeline_uses_position() {
        let timeline = HeadlessTimeline::new();
        let mut props = map! { "stagger" => 100, "position" => 1.0 };
        let options = AnimationOptions::extract(&mut props, DEFAULT_DURATION_MS);
        assert_eq!(options.start_offset(&timeline), Some(1.0));
    }
}

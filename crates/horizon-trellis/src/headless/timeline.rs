//! Recording timeline.

use std::fmt;

use horizon_trellis_core::Map;
use parking_lot::Mutex;

use crate::render::NodeRef;
use crate::timeline::{CompletionHandler, Ease, Timeline, Tween, TweenSpan};

/// A tween as placed on a [`HeadlessTimeline`].
#[derive(Debug, Clone)]
pub struct RecordedTween {
    pub node: NodeRef,
    /// Absolute start in seconds.
    pub start: f64,
    pub duration: f64,
    pub properties: Map,
    pub ease: Option<Ease>,
}

impl RecordedTween {
    pub fn span(&self) -> TweenSpan {
        TweenSpan {
            start: self.start,
            duration: self.duration,
        }
    }
}

#[derive(Default)]
struct TimelineState {
    tweens: Vec<RecordedTween>,
    playing: bool,
    time: f64,
    repeat: i32,
    plays: usize,
    on_complete: Option<CompletionHandler>,
}

/// A timeline that records tweens instead of running them.
///
/// Nothing advances on its own; call [`complete`](HeadlessTimeline::complete)
/// to simulate the end of playback.
#[derive(Default)]
pub struct HeadlessTimeline {
    state: Mutex<TimelineState>,
}

impl HeadlessTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tweens(&self) -> Vec<RecordedTween> {
        self.state.lock().tweens.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn is_paused(&self) -> bool {
        !self.is_playing()
    }

    /// Number of times `play` was called.
    pub fn play_count(&self) -> usize {
        self.state.lock().plays
    }

    /// Current playhead in seconds.
    pub fn time(&self) -> f64 {
        self.state.lock().time
    }

    pub fn repeat(&self) -> i32 {
        self.state.lock().repeat
    }

    pub fn has_on_complete(&self) -> bool {
        self.state.lock().on_complete.is_some()
    }

    /// Finish playback: move the playhead to the end, stop, and run the
    /// completion handler if one is registered.
    pub fn complete(&self) {
        let handler = {
            let mut state = self.state.lock();
            state.time = total_duration(&state.tweens);
            state.playing = false;
            state.on_complete.take()
        };
        if let Some(handler) = handler {
            handler();
        }
    }
}

fn total_duration(tweens: &[RecordedTween]) -> f64 {
    tweens
        .iter()
        .map(|tween| tween.start + tween.duration)
        .fold(0.0, f64::max)
}

impl Timeline for HeadlessTimeline {
    fn play(&self) {
        let mut state = self.state.lock();
        state.playing = true;
        state.plays += 1;
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn clear(&self) {
        self.state.lock().tweens.clear();
    }

    fn seek(&self, time: f64) {
        self.state.lock().time = time;
    }

    fn set_repeat(&self, count: i32) {
        self.state.lock().repeat = count;
    }

    fn to(&self, tween: Tween) {
        let mut state = self.state.lock();
        let start = tween
            .position
            .unwrap_or_else(|| total_duration(&state.tweens));
        state.tweens.push(RecordedTween {
            node: tween.node,
            start,
            duration: tween.duration,
            properties: tween.properties,
            ease: tween.ease,
        });
    }

    fn duration(&self) -> f64 {
        total_duration(&self.state.lock().tweens)
    }

    fn recent(&self) -> Option<TweenSpan> {
        self.state.lock().tweens.last().map(RecordedTween::span)
    }

    fn set_on_complete(&self, handler: Option<CompletionHandler>) {
        self.state.lock().on_complete = handler;
    }
}

impl fmt::Debug for HeadlessTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HeadlessTimeline")
            .field("tweens", &state.tweens.len())
            .field("playing", &state.playing)
            .field("time", &state.time)
            .field("repeat", &state.repeat)
            .finish()
    }
}

//! Named easing curves for tweens.
//!
//! Animation definitions name their curve with the `ease` meta-field and may
//! attach numeric parameters with `easeConfig`. Interpolation itself is the
//! timeline's business; this module only resolves names.

use std::fmt;
use std::str::FromStr;

/// Available easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Linear interpolation (no easing).
    #[default]
    Linear,
    /// Quadratic ease-in (starts slow, accelerates).
    EaseIn,
    /// Quadratic ease-out (starts fast, decelerates).
    EaseOut,
    /// Quadratic ease-in-out (smooth start and end).
    EaseInOut,
    /// Cubic ease-in (more pronounced than quadratic).
    EaseInCubic,
    /// Cubic ease-out (more pronounced than quadratic).
    EaseOutCubic,
    /// Cubic ease-in-out (more pronounced than quadratic).
    EaseInOutCubic,
    /// Sinusoidal ease-in.
    EaseInSine,
    /// Sinusoidal ease-out.
    EaseOutSine,
    /// Sinusoidal ease-in-out.
    EaseInOutSine,
}

impl Easing {
    /// All curves, in declaration order.
    pub const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
    ];

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInCubic => "ease-in-cubic",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::EaseInOutCubic => "ease-in-out-cubic",
            Easing::EaseInSine => "ease-in-sine",
            Easing::EaseOutSine => "ease-out-sine",
            Easing::EaseInOutSine => "ease-in-out-sine",
        }
    }

    /// Look a curve up by name.
    ///
    /// Accepts kebab-case (`ease-in-out`), camelCase (`easeInOut`) and
    /// snake_case (`ease_in_out`), case-insensitively.
    pub fn find(name: &str) -> Option<Easing> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        Easing::ALL.into_iter().find(|easing| {
            easing.name().replace('-', "") == normalized
        })
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::find(s).ok_or_else(|| format!("unknown easing '{s}'"))
    }
}

/// A resolved ease: a curve plus optional curve parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ease {
    pub easing: Easing,
    /// Parameters from the `easeConfig` meta-field (e.g. overshoot amount).
    pub config: Vec<f64>,
}

impl Ease {
    /// An unparameterized ease.
    pub fn new(easing: Easing) -> Self {
        Self {
            easing,
            config: Vec::new(),
        }
    }

    /// Attach curve parameters.
    pub fn configured(mut self, config: impl IntoIterator<Item = f64>) -> Self {
        self.config = config.into_iter().collect();
        self
    }
}

impl From<Easing> for Ease {
    fn from(easing: Easing) -> Self {
        Self::new(easing)
    }
}

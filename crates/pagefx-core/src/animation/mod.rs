#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! - [`Tween`]: a fixed-duration progress clock anchored at its first sample.
//! - [`Easing`]: interpolation curves applied to linear progress.
//! - [`StaggerGroup`]: delay schedule for a parent's cascade of children.
//!
//! Everything here is pure: the caller supplies page time, nothing sleeps or
//! schedules.

pub mod stagger;

pub use stagger::StaggerGroup;

use std::time::Duration;

/// Interpolation curve over progress in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    /// `1 - (1 - p)^2`
    EaseOutQuad,
    /// `1 - (1 - p)^3`
    EaseOutCubic,
    /// `1 - (1 - p)^4`
    #[default]
    EaseOutQuart,
}

impl Easing {
    /// Apply the curve. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, progress: f64) -> f64 {
        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        match self {
            Self::Linear => p,
            Self::EaseOutQuad => 1.0 - (1.0 - p).powi(2),
            Self::EaseOutCubic => 1.0 - (1.0 - p).powi(3),
            Self::EaseOutQuart => ease_out_quart(p),
        }
    }
}

/// The quartic ease-out curve `1 - (1 - p)^4`.
#[inline]
#[must_use]
pub fn ease_out_quart(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(4)
}

/// One sample of a [`Tween`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample {
    /// Linear progress in `[0, 1]`.
    pub progress: f64,
    /// Eased progress in `[0, 1]`.
    pub eased: f64,
}

impl TweenSample {
    /// Whether the tween has reached its end.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Fixed-duration progress clock.
///
/// The start time is latched by the first [`sample`](Tween::sample) call and
/// never reset, so sampling is idempotent with respect to the start: a second
/// "start" cannot rewind the animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    duration: Duration,
    easing: Easing,
    start: Option<Duration>,
}

impl Tween {
    #[must_use]
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            start: None,
        }
    }

    /// Page time of the first sample, if any.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Option<Duration> {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sample at page time `now`, latching the start on first use.
    pub fn sample(&mut self, now: Duration) -> TweenSample {
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        TweenSample {
            progress,
            eased: self.easing.apply(progress),
        }
    }
}

#![forbid(unsafe_code)]

//! Page-time sources.
//!
//! The runtime measures everything as a [`Duration`] since page start ("page
//! time") and never reads a clock itself: the host passes the current page
//! time into every call. Browsers use `performance.now()`. Native hosts use a
//! [`Clock`], which is either real time or a [`LabClock`] advanced by hand.
//!
//! # Example
//!
//! ```
//! use pagefx_core::clock::{Clock, LabClock};
//! use web_time::Duration;
//!
//! let lab = LabClock::new();
//! let clock = Clock::lab(&lab);
//! assert_eq!(clock.now(), Duration::ZERO);
//!
//! lab.advance(Duration::from_millis(16));
//! assert_eq!(clock.now(), Duration::from_millis(16));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use web_time::{Duration, Instant};

/// A manually-advanceable clock for deterministic tests.
///
/// Clones share the same time; advancing one advances all.
#[derive(Debug, Clone, Default)]
pub struct LabClock {
    offset_us: Arc<AtomicU64>,
}

impl LabClock {
    /// A lab clock at page time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `delta`.
    pub fn advance(&self, delta: Duration) {
        let us = delta.as_micros().min(u64::MAX as u128) as u64;
        self.offset_us.fetch_add(us, Ordering::Release);
    }

    /// Advance by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute page time. Moving backwards is ignored.
    pub fn set(&self, now: Duration) {
        let us = now.as_micros().min(u64::MAX as u128) as u64;
        self.offset_us.fetch_max(us, Ordering::AcqRel);
    }

    /// Current page time.
    #[must_use]
    pub fn now(&self) -> Duration {
        Duration::from_micros(self.offset_us.load(Ordering::Acquire))
    }
}

/// Page-time source for native hosts.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall-clock time since the clock was created.
    Real(Instant),
    /// Deterministic lab time.
    Lab(LabClock),
}

impl Clock {
    /// Real time starting now.
    #[must_use]
    pub fn real() -> Self {
        Self::Real(Instant::now())
    }

    /// Share a lab clock.
    #[must_use]
    pub fn lab(clock: &LabClock) -> Self {
        Self::Lab(clock.clone())
    }

    /// Current page time.
    #[must_use]
    pub fn now(&self) -> Duration {
        match self {
            Self::Real(epoch) => epoch.elapsed(),
            Self::Lab(clock) => clock.now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_lab(&self) -> bool {
        matches!(self, Self::Lab(_))
    }
}

/// Convert a host timestamp in (fractional) milliseconds to page time.
///
/// Negative and non-finite inputs map to zero.
#[must_use]
pub fn duration_from_ms(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_nanos((ms * 1_000_000.0).round().min(u64::MAX as f64) as u64)
    } else {
        Duration::ZERO
    }
}

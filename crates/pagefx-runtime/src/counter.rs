#![forbid(unsafe_code)]

//! Eased numeric counters driven by animation frames.
//!
//! A counter runs from 0 to its `data-target` over a fixed duration with the
//! quartic ease-out curve, one update per frame. The start time is latched on
//! the first frame.
//!
//! # Invariants
//!
//! 1. One lifecycle per element: a second `start` is refused, even after the
//!    animation finished.
//! 2. Displayed values never decrease.
//! 3. The last frame writes exactly the target; no frame is requested after.

use std::time::Duration;

use ahash::AHashMap;
use pagefx_core::animation::{Easing, Tween};
use pagefx_core::format::{Locale, group_digits, parse_leading_integer};
use pagefx_core::{Document, ElementId};

use crate::config::CounterConfig;
use crate::error::{PageError, Result};
use crate::scheduler::Scheduler;
use crate::task::Task;

/// Where a counter is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterPhase {
    /// Started, waiting for its first frame.
    Waiting,
    Running,
    Done,
}

#[derive(Clone, Debug)]
struct CounterState {
    target: u64,
    tween: Tween,
    displayed: Option<u64>,
    phase: CounterPhase,
}

#[derive(Debug, Clone)]
pub struct CounterAnimator {
    target_attribute: String,
    locale: Locale,
    duration: Duration,
    counters: AHashMap<ElementId, CounterState>,
}

impl CounterAnimator {
    #[must_use]
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            target_attribute: config.target_attribute.clone(),
            locale: config.number_locale(),
            duration: config.duration(),
            counters: AHashMap::new(),
        }
    }

    /// Read the element's target and request its first frame.
    ///
    /// Returns `Ok(false)` if the element already has a counter.
    pub fn start<D: Document + ?Sized>(
        &mut self,
        doc: &D,
        scheduler: &mut Scheduler<Task>,
        element: ElementId,
    ) -> Result<bool> {
        if self.counters.contains_key(&element) {
            return Ok(false);
        }
        let raw = doc.attribute(element, &self.target_attribute);
        let target = raw
            .as_deref()
            .and_then(parse_leading_integer)
            .ok_or(PageError::InvalidTarget { element, raw })?;
        self.counters.insert(
            element,
            CounterState {
                target,
                tween: Tween::new(self.duration, Easing::EaseOutQuart),
                displayed: None,
                phase: CounterPhase::Waiting,
            },
        );
        scheduler.request_frame(Task::CounterFrame(element));
        tracing::debug!(message = "counter.start", element = element.get(), target);
        Ok(true)
    }

    /// Render one frame at page time `now`.
    pub fn on_frame<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        element: ElementId,
        now: Duration,
    ) -> Result<()> {
        let Some(state) = self.counters.get_mut(&element) else {
            return Ok(());
        };
        if state.phase == CounterPhase::Done {
            return Ok(());
        }
        let sample = state.tween.sample(now);
        let value = if sample.is_complete() {
            state.target
        } else {
            let raw = (sample.eased * state.target as f64).floor() as u64;
            // Never regress below what is already shown.
            raw.min(state.target).max(state.displayed.unwrap_or(0))
        };
        state.displayed = Some(value);
        if sample.is_complete() {
            state.phase = CounterPhase::Done;
            tracing::debug!(message = "counter.done", element = element.get(), value);
        } else {
            state.phase = CounterPhase::Running;
            scheduler.request_frame(Task::CounterFrame(element));
        }
        doc.set_text(element, &group_digits(value, &self.locale))?;
        Ok(())
    }

    #[must_use]
    pub fn phase(&self, element: ElementId) -> Option<CounterPhase> {
        self.counters.get(&element).map(|s| s.phase)
    }

    /// Last value written, if any frame ran.
    #[must_use]
    pub fn displayed(&self, element: ElementId) -> Option<u64> {
        self.counters.get(&element).and_then(|s| s.displayed)
    }

    #[must_use]
    pub fn target(&self, element: ElementId) -> Option<u64> {
        self.counters.get(&element).map(|s| s.target)
    }

    /// Counters that still want frames.
    #[must_use]
    pub fn running(&self) -> usize {
        self.counters
            .values()
            .filter(|s| s.phase != CounterPhase::Done)
            .count()
    }
}

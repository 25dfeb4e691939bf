#![forbid(unsafe_code)]

//! Trailing-edge debouncing over the host-driven [`Scheduler`].
//!
//! A burst of triggers collapses to one action, run `wait` after the last
//! trigger, with that trigger's arguments.
//!
//! Two shapes are provided:
//!
//! - [`Debouncer`] keeps only the pending arguments and timer; the owner
//!   shares its scheduler with other components and routes the fired task
//!   back through [`Debouncer::fire`].
//! - [`Debounced`] wraps an action and owns a private scheduler, for callers
//!   that just want `debounce(action, wait)`.
//!
//! # Invariants
//!
//! 1. At most one timer is outstanding per debouncer.
//! 2. The action never runs inside `trigger`.
//! 3. The action receives the arguments of the most recent trigger.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use pagefx_runtime::debounce::debounce;
//!
//! let mut seen = Vec::new();
//! let mut d = debounce(|v: u32| seen.push(v), Duration::from_millis(10));
//! d.call(Duration::from_millis(0), 1);
//! d.call(Duration::from_millis(5), 2);
//! d.call(Duration::from_millis(12), 3);
//! assert_eq!(d.advance(Duration::from_millis(21)), 0);
//! assert_eq!(d.advance(Duration::from_millis(22)), 1);
//! drop(d);
//! assert_eq!(seen, vec![3]);
//! ```

use std::time::Duration;

use crate::scheduler::{Scheduler, TimerId};

/// Pending-call state of one debounced action.
#[derive(Debug, Clone)]
pub struct Debouncer<A> {
    wait: Duration,
    pending: Option<A>,
    timer: Option<TimerId>,
}

impl<A> Debouncer<A> {
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
            timer: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Whether a trailing call is waiting to fire.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Record a call: cancel the outstanding timer and arm a new one that
    /// delivers `task` after the quiet period.
    pub fn trigger<T>(&mut self, scheduler: &mut Scheduler<T>, now: Duration, args: A, task: T) {
        if let Some(old) = self.timer.take() {
            scheduler.cancel(old);
        }
        self.pending = Some(args);
        self.timer = Some(scheduler.schedule_after(now, self.wait, task));
    }

    /// Claim the arguments for a fired timer. Returns `None` for a timer this
    /// debouncer no longer owns.
    pub fn fire(&mut self, timer: TimerId) -> Option<A> {
        if self.timer != Some(timer) {
            return None;
        }
        self.timer = None;
        self.pending.take()
    }

    /// Drop the pending call.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
        self.pending = None;
    }
}

/// A debounced action with its own timer queue.
pub struct Debounced<A, F> {
    action: F,
    state: Debouncer<A>,
    scheduler: Scheduler<()>,
}

/// Wrap `action` so bursts of calls collapse to one trailing call.
pub fn debounce<A, F: FnMut(A)>(action: F, wait: Duration) -> Debounced<A, F> {
    Debounced {
        action,
        state: Debouncer::new(wait),
        scheduler: Scheduler::new(),
    }
}

impl<A, F: FnMut(A)> Debounced<A, F> {
    /// Trigger at page time `now`.
    pub fn call(&mut self, now: Duration, args: A) {
        self.state.trigger(&mut self.scheduler, now, args, ());
    }

    /// Run the action if its quiet period has elapsed by `now`. Returns the
    /// number of invocations (0 or 1).
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut ran = 0;
        while let Some(due) = self.scheduler.pop_due(now) {
            if let Some(args) = self.state.fire(due.id) {
                (self.action)(args);
                ran += 1;
            }
        }
        ran
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Drop the pending call without running it.
    pub fn cancel(&mut self) {
        self.state.cancel(&mut self.scheduler);
    }
}

#![forbid(unsafe_code)]

//! Platform-independent runner core.
//!
//! Wraps a [`PageRuntime`] with a host-driven lab clock and an encoded event
//! queue. The wasm module drives it from browser callbacks; native tests
//! drive it directly with a [`MemoryDocument`](pagefx_core::memory::MemoryDocument).

use std::collections::VecDeque;
use std::time::Duration;

use pagefx_core::clock::{LabClock, duration_from_ms};
use pagefx_core::storage::KeyValueStore;
use pagefx_core::{Document, ElementId, EventOutcome, IntersectionEntry, PageEvent};
use pagefx_runtime::{BootReport, PageConfig, PageRuntime, Result};
use serde::Serialize;

/// Summary of one [`RunnerCore::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepResult {
    /// Queued events dispatched.
    pub events_processed: u32,
    /// Timers that fired.
    pub timers_run: u32,
    /// A frame callback is waiting.
    pub wants_frame: bool,
    /// Milliseconds until the next timer, if any.
    pub next_timer_ms: Option<f64>,
}

fn micros_to_ms(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}

pub struct RunnerCore<D, S> {
    runtime: PageRuntime<D, S>,
    clock: LabClock,
    queue: VecDeque<PageEvent>,
}

impl<D: Document, S: KeyValueStore> RunnerCore<D, S> {
    pub fn new(doc: D, store: S, config: PageConfig) -> Self {
        Self {
            runtime: PageRuntime::with_config(doc, store, config),
            clock: LabClock::new(),
            queue: VecDeque::new(),
        }
    }

    /// Build from an optional partial JSON config. `host_locale` fills the
    /// counter locale when the config leaves it unset.
    pub fn from_config_json(
        doc: D,
        store: S,
        config_json: Option<&str>,
        host_locale: Option<String>,
    ) -> Result<Self> {
        let mut config = match config_json {
            Some(json) => PageConfig::from_json(json)?,
            None => PageConfig::default(),
        };
        if config.counter.locale.is_none() {
            config.counter.locale = host_locale;
        }
        Ok(Self::new(doc, store, config))
    }

    /// Boot the page at the current time.
    pub fn init(&mut self) -> BootReport {
        self.runtime.boot(self.clock.now())
    }

    // -- Time ------------------------------------------------------------

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        micros_to_ms(self.clock.now())
    }

    pub fn advance_time_ms(&mut self, dt_ms: f64) {
        self.clock.advance(duration_from_ms(dt_ms));
    }

    /// Jump to an absolute host timestamp. Going backwards is ignored.
    pub fn set_time_ms(&mut self, ts_ms: f64) {
        self.clock.set(duration_from_ms(ts_ms));
    }

    // -- Input -----------------------------------------------------------

    /// Dispatch an event immediately, e.g. when the host must know whether
    /// to prevent the default action.
    pub fn dispatch(&mut self, event: &PageEvent) -> EventOutcome {
        self.runtime.handle_event(event, self.clock.now())
    }

    /// Queue a JSON-encoded [`PageEvent`] for the next [`step`](Self::step).
    /// Returns `false` if it does not parse.
    pub fn push_encoded_event(&mut self, json: &str) -> bool {
        match serde_json::from_str::<PageEvent>(json) {
            Ok(event) => {
                self.queue.push_back(event);
                true
            }
            Err(err) => {
                tracing::warn!(message = "runner.bad_event", error = %err);
                false
            }
        }
    }

    /// Reveal-observer batch. Returns the elements to unobserve.
    pub fn push_intersections(&mut self, entries: &[IntersectionEntry]) -> Vec<ElementId> {
        self.runtime.handle_intersections(entries, self.clock.now())
    }

    /// Image-observer batch. Returns the images to unobserve.
    pub fn push_image_intersections(&mut self, entries: &[IntersectionEntry]) -> Vec<ElementId> {
        self.runtime
            .handle_image_intersections(entries, self.clock.now())
    }

    // -- Pumping ---------------------------------------------------------

    /// Dispatch queued events, then run every timer due at the current time.
    pub fn step(&mut self) -> StepResult {
        let now = self.clock.now();
        let mut events_processed = 0;
        while let Some(event) = self.queue.pop_front() {
            self.runtime.handle_event(&event, now);
            events_processed += 1;
        }
        let timers_run = self.runtime.advance(now) as u32;
        StepResult {
            events_processed,
            timers_run,
            wants_frame: self.runtime.wants_frame(),
            next_timer_ms: self.next_timer_ms(),
        }
    }

    /// Run one animation frame at host timestamp `ts_ms`.
    pub fn frame(&mut self, ts_ms: f64) -> usize {
        self.set_time_ms(ts_ms);
        self.runtime.animation_frame(self.clock.now())
    }

    /// Milliseconds from now until the earliest timer.
    #[must_use]
    pub fn next_timer_ms(&self) -> Option<f64> {
        let now = self.clock.now();
        self.runtime
            .next_deadline()
            .map(|deadline| micros_to_ms(deadline.saturating_sub(now)))
    }

    #[must_use]
    pub fn wants_frame(&self) -> bool {
        self.runtime.wants_frame()
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    #[must_use]
    pub fn runtime(&self) -> &PageRuntime<D, S> {
        &self.runtime
    }

    #[inline]
    pub fn runtime_mut(&mut self) -> &mut PageRuntime<D, S> {
        &mut self.runtime
    }

    /// Stop everything. Queued events are dropped.
    pub fn teardown(&mut self) {
        self.queue.clear();
        self.runtime.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefx_core::Rect;
    use pagefx_core::memory::MemoryDocument;
    use pagefx_core::storage::MemoryStore;
    use pagefx_runtime::Severity;
    use pretty_assertions::assert_eq;

    fn core_with(doc: MemoryDocument) -> RunnerCore<MemoryDocument, MemoryStore> {
        RunnerCore::new(doc, MemoryStore::new(), PageConfig::default())
    }

    #[test]
    fn init_then_empty_step() {
        let mut core = core_with(MemoryDocument::default());
        let report = core.init();
        assert!(report.reveal.is_empty());
        let result = core.step();
        assert_eq!(result.events_processed, 0);
        assert_eq!(result.timers_run, 0);
        // Hero intro is pending.
        assert_eq!(result.next_timer_ms, Some(300.0));
    }

    #[test]
    fn encoded_key_event_round_trip() {
        let mut core = core_with(MemoryDocument::default());
        core.init();
        assert!(core.push_encoded_event(r#"{"kind":"key","key":"k","ctrl":true}"#));
        assert_eq!(core.pending_events(), 1);
        let result = core.step();
        assert_eq!(result.events_processed, 1);

        let active = core.runtime().notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Info);

        core.advance_time_ms(100.0);
        // Notification slide-in.
        assert_eq!(core.step().timers_run, 1);
    }

    #[test]
    fn malformed_event_is_rejected() {
        let mut core = core_with(MemoryDocument::default());
        assert!(!core.push_encoded_event("{\"kind\":\"teleport\"}"));
        assert!(!core.push_encoded_event("not json"));
        assert_eq!(core.pending_events(), 0);
    }

    #[test]
    fn dispatch_reports_prevent_default() {
        let mut doc = MemoryDocument::default();
        let form = doc.element("form").append();
        let mut core = core_with(doc);
        core.init();
        let outcome = core.dispatch(&PageEvent::Submit {
            form,
            fields: Default::default(),
        });
        assert_eq!(outcome, EventOutcome::PREVENT_DEFAULT);
    }

    #[test]
    fn intersections_release_and_frames_run_counter() {
        let mut doc = MemoryDocument::default();
        let stat = doc
            .element("div")
            .class("fade-in-up number-animate")
            .attr("data-target", "250")
            .rect(Rect::new(0.0, 100.0, 100.0, 50.0))
            .append();
        let mut core = core_with(doc);
        let report = core.init();
        assert_eq!(report.reveal, vec![stat]);

        core.set_time_ms(1_000.0);
        let released = core.push_intersections(&[IntersectionEntry {
            element: stat,
            ratio: 0.6,
            is_intersecting: true,
        }]);
        assert_eq!(released, vec![stat]);
        assert!(core.wants_frame());

        let mut ts = 1_016.0;
        while core.wants_frame() {
            assert_eq!(core.frame(ts), 1);
            ts += 100.0;
        }
        assert_eq!(
            core.runtime().document().text(stat).as_deref(),
            Some("250")
        );
    }

    #[test]
    fn time_never_rewinds() {
        let mut core = core_with(MemoryDocument::default());
        core.set_time_ms(500.0);
        core.set_time_ms(200.0);
        assert_eq!(core.now_ms(), 500.0);
        core.advance_time_ms(-5.0);
        assert_eq!(core.now_ms(), 500.0);
    }

    #[test]
    fn config_json_overrides() {
        let core = RunnerCore::from_config_json(
            MemoryDocument::default(),
            MemoryStore::new(),
            Some(r#"{"notification":{"display_ms":3000}}"#),
            None,
        )
        .expect("config");
        assert_eq!(core.runtime().config().notification.display_ms, 3000);
        assert!(
            RunnerCore::from_config_json(
                MemoryDocument::default(),
                MemoryStore::new(),
                Some("[1, 2]"),
                None,
            )
            .is_err()
        );
    }

    #[test]
    fn host_locale_fills_unset_counter_locale() {
        let core = RunnerCore::from_config_json(
            MemoryDocument::default(),
            MemoryStore::new(),
            None,
            Some("de-AT".to_string()),
        )
        .expect("config");
        assert_eq!(core.runtime().config().counter.locale.as_deref(), Some("de-AT"));

        let core = RunnerCore::from_config_json(
            MemoryDocument::default(),
            MemoryStore::new(),
            Some(r#"{"counter":{"locale":"en-IN"}}"#),
            Some("de-AT".to_string()),
        )
        .expect("config");
        assert_eq!(core.runtime().config().counter.locale.as_deref(), Some("en-IN"));
    }

    #[test]
    fn teardown_drops_queue() {
        let mut core = core_with(MemoryDocument::default());
        core.init();
        assert!(core.push_encoded_event(r#"{"kind":"scroll"}"#));
        core.teardown();
        assert_eq!(core.pending_events(), 0);
        assert_eq!(core.step().next_timer_ms, None);
    }
}

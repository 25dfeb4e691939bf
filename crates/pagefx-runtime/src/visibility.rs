#![forbid(unsafe_code)]

//! One-shot visibility watcher.
//!
//! [`VisibilityWatcher`] tracks registered elements and turns intersection
//! samples into [`ActivationEvent`]s. Each element moves through
//! `Pending → Activated → Released` exactly once.
//!
//! Samples come from either the host's `IntersectionObserver`
//! ([`VisibilityWatcher::observe_batch`]) or a geometry scan over a
//! [`Document`] ([`VisibilityWatcher::scan`]) for hosts without one.
//!
//! # Invariants
//!
//! 1. At most one activation per element for the watcher's lifetime.
//! 2. Activation is level-triggered: an element already past the threshold
//!    activates on the first sample after registration.
//! 3. A batch returns every activation before anything is released; the
//!    caller releases once it has processed the whole batch.
//! 4. A released element keeps a tombstone, so re-registering it is refused
//!    and its status stays queryable. The tombstone is a bare map entry with
//!    no tags or geometry; tombstones live until [`VisibilityWatcher::clear`]
//!    (page teardown), so a watcher holds one entry per element ever
//!    registered.
//!
//! # Failure Modes
//!
//! - Samples for unknown elements are ignored.
//! - Elements whose rectangle cannot be read (detached) are skipped by
//!   `scan` and stay pending.

use std::time::Duration;

use ahash::AHashMap;
use pagefx_core::geometry::intersection_ratio;
use pagefx_core::{BehaviorTags, Document, ElementId, IntersectionEntry, RootMargin};

/// Trigger options, as an `IntersectionObserver` takes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatcherOptions {
    /// Minimum visible fraction that activates an element.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }
}

/// Lifecycle of a watched element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchStatus {
    Pending,
    Activated,
    Released,
}

/// An element crossed its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationEvent {
    pub element: ElementId,
    pub tags: BehaviorTags,
    /// Page time of the sample that crossed the threshold.
    pub at: Duration,
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Pending(BehaviorTags),
    Activated(BehaviorTags),
    Released,
}

impl Slot {
    fn status(self) -> WatchStatus {
        match self {
            Self::Pending(_) => WatchStatus::Pending,
            Self::Activated(_) => WatchStatus::Activated,
            Self::Released => WatchStatus::Released,
        }
    }
}

/// Registry of watched elements, in registration order.
#[derive(Clone, Debug, Default)]
pub struct VisibilityWatcher {
    options: WatcherOptions,
    order: Vec<ElementId>,
    slots: AHashMap<ElementId, Slot>,
}

impl VisibilityWatcher {
    #[must_use]
    pub fn new(options: WatcherOptions) -> Self {
        Self {
            options,
            order: Vec::new(),
            slots: AHashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> WatcherOptions {
        self.options
    }

    /// Register an element. Returns `false` if it is already known, including
    /// elements that activated and were released.
    pub fn observe(&mut self, element: ElementId, tags: BehaviorTags) -> bool {
        if self.slots.contains_key(&element) {
            return false;
        }
        self.slots.insert(element, Slot::Pending(tags));
        self.order.push(element);
        true
    }

    #[must_use]
    pub fn status(&self, element: ElementId) -> Option<WatchStatus> {
        self.slots.get(&element).map(|slot| slot.status())
    }

    /// Tags of a pending or activated element.
    #[must_use]
    pub fn tags(&self, element: ElementId) -> Option<BehaviorTags> {
        match self.slots.get(&element)? {
            Slot::Pending(tags) | Slot::Activated(tags) => Some(*tags),
            Slot::Released => None,
        }
    }

    /// Elements still waiting to activate, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|el| matches!(self.slots.get(el), Some(Slot::Pending(_))))
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    fn activates(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.options.threshold
    }

    /// Process one batch of samples. Returns the activations in batch order;
    /// duplicates and samples for non-pending elements are ignored.
    pub fn observe_batch(
        &mut self,
        entries: &[IntersectionEntry],
        now: Duration,
    ) -> Vec<ActivationEvent> {
        let mut events = Vec::new();
        for entry in entries {
            if !self.activates(entry) {
                continue;
            }
            let Some(slot) = self.slots.get_mut(&entry.element) else {
                continue;
            };
            if let Slot::Pending(tags) = *slot {
                *slot = Slot::Activated(tags);
                tracing::debug!(
                    message = "visibility.activate",
                    element = entry.element.get(),
                    ratio = entry.ratio,
                    at_ms = now.as_millis() as u64
                );
                events.push(ActivationEvent {
                    element: entry.element,
                    tags,
                    at: now,
                });
            }
        }
        events
    }

    /// Sample every pending element's geometry and process the batch.
    pub fn scan<D: Document + ?Sized>(&mut self, doc: &D, now: Duration) -> Vec<ActivationEvent> {
        let root = doc.viewport().root_rect();
        let entries: Vec<IntersectionEntry> = self
            .pending()
            .filter_map(|element| {
                let rect = doc.bounding_rect(element)?;
                let ratio = intersection_ratio(&rect, &root, &self.options.root_margin);
                Some(IntersectionEntry {
                    element,
                    ratio,
                    is_intersecting: ratio > 0.0,
                })
            })
            .collect();
        self.observe_batch(&entries, now)
    }

    /// Stop watching an activated element. Returns `false` unless it was
    /// activated and not yet released.
    pub fn release(&mut self, element: ElementId) -> bool {
        let Some(slot) = self.slots.get_mut(&element) else {
            return false;
        };
        if !matches!(slot, Slot::Activated(_)) {
            return false;
        }
        *slot = Slot::Released;
        self.order.retain(|&el| el != element);
        tracing::debug!(message = "visibility.release", element = element.get());
        true
    }

    /// Forget everything (teardown).
    pub fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefx_core::Rect;
    use pagefx_core::memory::MemoryDocument;

    fn opts() -> WatcherOptions {
        WatcherOptions {
            threshold: 0.1,
            root_margin: RootMargin::bottom(-50.0),
        }
    }

    fn entry(raw: u32, ratio: f64) -> IntersectionEntry {
        IntersectionEntry {
            element: ElementId::new(raw),
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }

    #[test]
    fn activates_once_then_releases() {
        let mut w = VisibilityWatcher::new(opts());
        let el = ElementId::new(3);
        assert!(w.observe(el, BehaviorTags::REVEAL));
        assert!(!w.observe(el, BehaviorTags::REVEAL));

        let events = w.observe_batch(&[entry(3, 0.5)], Duration::from_millis(16));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].at, Duration::from_millis(16));
        assert_eq!(w.status(el), Some(WatchStatus::Activated));

        assert!(w.observe_batch(&[entry(3, 1.0)], Duration::ZERO).is_empty());
        assert!(w.release(el));
        assert!(!w.release(el));
        assert_eq!(w.status(el), Some(WatchStatus::Released));
        assert_eq!(w.tags(el), None);
        assert!(!w.observe(el, BehaviorTags::REVEAL));
    }

    #[test]
    fn clear_drops_tombstones() {
        let mut w = VisibilityWatcher::new(opts());
        let el = ElementId::new(4);
        w.observe(el, BehaviorTags::REVEAL);
        w.observe_batch(&[entry(4, 1.0)], Duration::ZERO);
        w.release(el);
        assert_eq!(w.status(el), Some(WatchStatus::Released));
        w.clear();
        assert_eq!(w.status(el), None);
    }

    #[test]
    fn below_threshold_stays_pending() {
        let mut w = VisibilityWatcher::new(opts());
        w.observe(ElementId::new(1), BehaviorTags::REVEAL);
        assert!(w.observe_batch(&[entry(1, 0.05)], Duration::ZERO).is_empty());
        assert!(w.observe_batch(&[entry(1, 0.0)], Duration::ZERO).is_empty());
        assert_eq!(w.pending_count(), 1);
    }

    #[test]
    fn duplicate_entries_in_batch_activate_once() {
        let mut w = VisibilityWatcher::new(opts());
        w.observe(ElementId::new(1), BehaviorTags::REVEAL);
        w.observe(ElementId::new(2), BehaviorTags::COUNTER);
        let events = w.observe_batch(
            &[entry(1, 0.5), entry(2, 0.5), entry(1, 0.9)],
            Duration::ZERO,
        );
        let ids: Vec<u32> = events.iter().map(|e| e.element.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(events[1].tags, BehaviorTags::COUNTER);
    }

    #[test]
    fn unknown_elements_ignored() {
        let mut w = VisibilityWatcher::new(opts());
        assert!(w.observe_batch(&[entry(99, 1.0)], Duration::ZERO).is_empty());
        assert_eq!(w.status(ElementId::new(99)), None);
    }

    #[test]
    fn zero_threshold_needs_intersection() {
        let mut w = VisibilityWatcher::new(WatcherOptions::default());
        w.observe(ElementId::new(1), BehaviorTags::empty());
        let miss = IntersectionEntry {
            element: ElementId::new(1),
            ratio: 0.0,
            is_intersecting: false,
        };
        assert!(w.observe_batch(&[miss], Duration::ZERO).is_empty());
        let touch = IntersectionEntry {
            is_intersecting: true,
            ..miss
        };
        assert_eq!(w.observe_batch(&[touch], Duration::ZERO).len(), 1);
    }

    #[test]
    fn scan_is_level_triggered_and_honors_margin() {
        let mut doc = MemoryDocument::default();
        doc.set_scroll_height(4000.0);
        let visible = doc
            .element("div")
            .rect(Rect::new(0.0, 100.0, 200.0, 200.0))
            .append();
        // Inside the viewport but entirely within the 50px bottom margin.
        let margin_only = doc
            .element("div")
            .rect(Rect::new(0.0, 760.0, 200.0, 40.0))
            .append();
        let far = doc
            .element("div")
            .rect(Rect::new(0.0, 2000.0, 200.0, 200.0))
            .append();

        let mut w = VisibilityWatcher::new(opts());
        for el in [visible, margin_only, far] {
            w.observe(el, BehaviorTags::REVEAL);
        }
        let first = w.scan(&doc, Duration::ZERO);
        assert_eq!(first.iter().map(|e| e.element).collect::<Vec<_>>(), vec![visible]);

        doc.set_scroll_y(1500.0);
        let second = w.scan(&doc, Duration::from_millis(500));
        assert_eq!(second.iter().map(|e| e.element).collect::<Vec<_>>(), vec![far]);
        assert_eq!(w.status(margin_only), Some(WatchStatus::Pending));
    }

    #[test]
    fn pending_preserves_registration_order() {
        let mut w = VisibilityWatcher::new(opts());
        for raw in [5, 2, 9] {
            w.observe(ElementId::new(raw), BehaviorTags::REVEAL);
        }
        w.observe_batch(&[entry(2, 1.0)], Duration::ZERO);
        w.release(ElementId::new(2));
        let ids: Vec<u32> = w.pending().map(ElementId::get).collect();
        assert_eq!(ids, vec![5, 9]);
    }
}

#![forbid(unsafe_code)]

//! Stagger group: delay schedule for a parent's cascade of children.
//!
//! A [`StaggerGroup`] holds the ordered children of one activated parent and
//! assigns the `i`-th child (zero-based) a delay of `i × interval` after the
//! parent's activation.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use pagefx_core::ElementId;
//! use pagefx_core::animation::StaggerGroup;
//!
//! let group = StaggerGroup::new(
//!     ElementId::new(1),
//!     vec![ElementId::new(2), ElementId::new(3)],
//!     Duration::from_millis(100),
//! );
//! let delays: Vec<_> = group.schedule().map(|(_, d)| d.as_millis()).collect();
//! assert_eq!(delays, vec![0, 100]);
//! ```
//!
//! # Invariants
//!
//! 1. Children keep the order they were given in (document order).
//! 2. `delay_for(i) == i × interval`; delays strictly increase when the
//!    interval is non-zero.
//! 3. An empty group schedules nothing.
//! 4. A child listed twice keeps only its first position.

use std::time::Duration;

use crate::element::ElementId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ordered children of one parent with their stagger interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaggerGroup {
    parent: ElementId,
    children: Vec<ElementId>,
    interval: Duration,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl StaggerGroup {
    /// Build a group. Duplicate children after their first occurrence are
    /// dropped.
    #[must_use]
    pub fn new(parent: ElementId, children: Vec<ElementId>, interval: Duration) -> Self {
        let mut unique = Vec::with_capacity(children.len());
        for child in children {
            if child != parent && !unique.contains(&child) {
                unique.push(child);
            }
        }
        Self {
            parent,
            children: unique,
            interval,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl StaggerGroup {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> ElementId {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Delay of the child at `index` relative to the parent's activation.
    #[must_use]
    pub fn delay_for(&self, index: usize) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of `child` in the cascade.
    #[must_use]
    pub fn position(&self, child: ElementId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// `(child, delay)` pairs in cascade order.
    pub fn schedule(&self) -> impl Iterator<Item = (ElementId, Duration)> + '_ {
        self.children
            .iter()
            .enumerate()
            .map(|(i, &child)| (child, self.delay_for(i)))
    }

    /// Delay after which the last child is revealed.
    #[must_use]
    pub fn total_span(&self) -> Duration {
        self.children
            .len()
            .checked_sub(1)
            .map_or(Duration::ZERO, |last| self.delay_for(last))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

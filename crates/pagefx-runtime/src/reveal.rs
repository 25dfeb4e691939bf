#![forbid(unsafe_code)]

//! Reveal-on-activation with a staggered cascade over descendants.
//!
//! On activation the element gets the visible class. If it was tagged
//! [`BehaviorTags::STAGGER_CHILDREN`], its reveal-class descendants are
//! collected in document order and child `i` is revealed `i × interval`
//! later via [`Task::RevealChild`]. Children are not watched themselves.

use std::time::Duration;

use ahash::AHashSet;
use pagefx_core::animation::StaggerGroup;
use pagefx_core::{BehaviorTags, Document, ElementId, Selector};

use crate::config::RevealConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::Task;
use crate::visibility::ActivationEvent;

#[derive(Debug, Clone)]
pub struct RevealAnimator {
    reveal: Selector,
    visible_class: String,
    interval: Duration,
    revealed: AHashSet<ElementId>,
}

impl RevealAnimator {
    #[must_use]
    pub fn new(config: &RevealConfig) -> Self {
        Self {
            reveal: Selector::class(config.reveal_class.clone()),
            visible_class: config.visible_class.clone(),
            interval: config.stagger_interval(),
            revealed: AHashSet::new(),
        }
    }

    /// Selector for reveal-class elements.
    #[inline]
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.reveal
    }

    /// Mark an activated element visible and schedule its stagger cascade.
    /// Returns the cascade, if any.
    pub fn activate<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        event: &ActivationEvent,
    ) -> Result<Option<StaggerGroup>> {
        self.mark_visible(doc, event.element)?;
        if !event.tags.contains(BehaviorTags::STAGGER_CHILDREN) {
            return Ok(None);
        }
        let children = doc.query_within(event.element, &self.reveal);
        let group = StaggerGroup::new(event.element, children, self.interval);
        for (child, delay) in group.schedule() {
            scheduler.schedule_after(
                event.at,
                delay,
                Task::RevealChild {
                    parent: event.element,
                    child,
                },
            );
        }
        tracing::debug!(
            message = "reveal.stagger",
            parent = event.element.get(),
            children = group.len(),
            span_ms = group.total_span().as_millis() as u64
        );
        Ok(Some(group))
    }

    /// Reveal one stagger child.
    pub fn reveal_child<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        parent: ElementId,
        child: ElementId,
    ) -> Result<()> {
        tracing::debug!(
            message = "reveal.child",
            parent = parent.get(),
            child = child.get()
        );
        self.mark_visible(doc, child)
    }

    fn mark_visible<D: Document + ?Sized>(&mut self, doc: &mut D, element: ElementId) -> Result<()> {
        doc.add_class(element, &self.visible_class)?;
        self.revealed.insert(element);
        Ok(())
    }

    #[must_use]
    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.revealed.contains(&element)
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}

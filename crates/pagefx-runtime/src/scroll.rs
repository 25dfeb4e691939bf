#![forbid(unsafe_code)]

//! Scroll progress bar and back-to-top button.
//!
//! Each indicator has its own [`Debouncer`]; a burst of scroll or resize
//! events produces one update per indicator after the quiet period. Resizes
//! count because the progress width depends on the viewport height.

use std::time::Duration;

use pagefx_core::{Document, ElementId, Selector, Viewport};

use crate::config::ScrollConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::scheduler::{Scheduler, TimerId};
use crate::task::Task;

/// Scroll progress in percent, clamped to `[0, 100]`.
#[must_use]
pub fn progress_percent(viewport: &Viewport) -> f64 {
    let scrollable = viewport.scroll_height - viewport.height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0.0;
    }
    let pct = viewport.scroll_y / scrollable * 100.0;
    if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) }
}

#[derive(Debug, Clone)]
pub struct ScrollIndicators {
    config: ScrollConfig,
    progress_bar: Option<ElementId>,
    back_to_top: Option<ElementId>,
    progress_debounce: Debouncer<()>,
    button_debounce: Debouncer<()>,
    button_shown: bool,
}

impl ScrollIndicators {
    #[must_use]
    pub fn attach<D: Document + ?Sized>(config: ScrollConfig, doc: &D) -> Self {
        let wait = config.debounce_after();
        Self {
            progress_bar: doc.query_first(&Selector::class(config.progress_class.clone())),
            back_to_top: doc.element_by_id(&config.back_to_top_id),
            progress_debounce: Debouncer::new(wait),
            button_debounce: Debouncer::new(wait),
            button_shown: false,
            config,
        }
    }

    /// A scroll event: restart both quiet periods.
    pub fn on_scroll(&mut self, scheduler: &mut Scheduler<Task>, now: Duration) {
        self.restart(scheduler, now);
    }

    /// A resize event: same quiet periods as scrolling.
    pub fn on_resize(&mut self, scheduler: &mut Scheduler<Task>, now: Duration) {
        self.restart(scheduler, now);
    }

    fn restart(&mut self, scheduler: &mut Scheduler<Task>, now: Duration) {
        if self.progress_bar.is_some() {
            self.progress_debounce
                .trigger(scheduler, now, (), Task::ScrollProgress);
        }
        if self.back_to_top.is_some() {
            self.button_debounce
                .trigger(scheduler, now, (), Task::BackToTop);
        }
    }

    /// Debounced progress update.
    pub fn update_progress<D: Document + ?Sized>(&mut self, doc: &mut D, timer: TimerId) -> Result<()> {
        let (Some(bar), Some(())) = (self.progress_bar, self.progress_debounce.fire(timer)) else {
            return Ok(());
        };
        let pct = progress_percent(&doc.viewport());
        doc.set_style(bar, "width", &format!("{pct}%"))?;
        Ok(())
    }

    /// Debounced back-to-top visibility update.
    pub fn update_back_to_top<D: Document + ?Sized>(&mut self, doc: &mut D, timer: TimerId) -> Result<()> {
        let (Some(button), Some(())) = (self.back_to_top, self.button_debounce.fire(timer)) else {
            return Ok(());
        };
        let show = doc.viewport().scroll_y > self.config.back_to_top_offset;
        if show != self.button_shown {
            tracing::debug!(message = "scroll.back_to_top", shown = show);
        }
        self.button_shown = show;
        let (remove, add) = if show {
            (&self.config.hidden_classes, &self.config.shown_classes)
        } else {
            (&self.config.shown_classes, &self.config.hidden_classes)
        };
        doc.remove_classes(button, remove)?;
        doc.add_classes(button, add)?;
        Ok(())
    }

    /// Whether a click on `target` belongs to the back-to-top button.
    #[must_use]
    pub fn is_back_to_top<D: Document + ?Sized>(&self, doc: &D, target: ElementId) -> bool {
        self.back_to_top.is_some_and(|b| doc.contains(b, target))
    }

    pub fn scroll_to_top<D: Document + ?Sized>(&self, doc: &mut D) -> Result<()> {
        doc.scroll_to_top(true)?;
        Ok(())
    }

    #[must_use]
    pub fn button_shown(&self) -> bool {
        self.button_shown
    }

    /// Drop pending updates (teardown).
    pub fn cancel(&mut self, scheduler: &mut Scheduler<Task>) {
        self.progress_debounce.cancel(scheduler);
        self.button_debounce.cancel(scheduler);
    }
}

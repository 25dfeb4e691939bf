#![forbid(unsafe_code)]

//! Mobile navigation menu.
//!
//! Open/closed is an explicit [`MenuState`]; the menu's classes are written
//! from it and never consulted.
//!
//! # Invariants
//!
//! 1. The button icon carries the open class exactly while the state is
//!    [`MenuState::Open`].
//! 2. A button click while [`MenuState::Closing`] cancels the pending close
//!    and returns to `Open`.
//! 3. Outside clicks and `Escape` close immediately, cancelling any pending
//!    close.

use std::time::Duration;

use pagefx_core::{Document, ElementId, Selector};

use crate::config::MenuConfig;
use crate::error::Result;
use crate::scheduler::{Scheduler, TimerId};
use crate::task::Task;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
    /// Close transition running; the menu hides when the timer fires.
    Closing { timer: TimerId },
}

/// What a click did to the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuClick {
    /// The click was on the toggle button.
    Toggled(MenuState),
    /// The click was outside both the button and the menu.
    Dismissed,
    /// The click was inside the menu or left the state unchanged.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct MobileMenu {
    config: MenuConfig,
    button: ElementId,
    menu: ElementId,
    state: MenuState,
}

impl MobileMenu {
    /// Bind to the page's button and menu; `None` if either is absent.
    pub fn attach<D: Document + ?Sized>(config: MenuConfig, doc: &D) -> Option<Self> {
        let button = doc.element_by_id(&config.button_id)?;
        let menu = doc.element_by_id(&config.menu_id)?;
        let state = if doc.has_class(menu, &config.hidden_class) {
            MenuState::Closed
        } else {
            MenuState::Open
        };
        Some(Self {
            config,
            button,
            menu,
            state,
        })
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    fn icon<D: Document + ?Sized>(&self, doc: &D) -> Option<ElementId> {
        doc.query_first_within(self.button, &Selector::tag("svg"))
    }

    fn sync_icon<D: Document + ?Sized>(&self, doc: &mut D) -> Result<()> {
        if let Some(svg) = self.icon(doc) {
            if self.is_open() {
                doc.add_class(svg, &self.config.icon_open_class)?;
            } else {
                doc.remove_class(svg, &self.config.icon_open_class)?;
            }
        }
        Ok(())
    }

    /// Route a document click.
    pub fn on_click<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
        target: ElementId,
    ) -> Result<MenuClick> {
        if doc.contains(self.button, target) {
            return self.toggle(doc, scheduler, now).map(MenuClick::Toggled);
        }
        if doc.contains(self.menu, target) || self.state == MenuState::Closed {
            return Ok(MenuClick::Ignored);
        }
        self.close_now(doc, scheduler)?;
        Ok(MenuClick::Dismissed)
    }

    /// Button press.
    pub fn toggle<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
    ) -> Result<MenuState> {
        match self.state {
            MenuState::Closed => {
                self.state = MenuState::Open;
                doc.remove_class(self.menu, &self.config.hidden_class)?;
                doc.add_class(self.menu, &self.config.opening_class)?;
            }
            MenuState::Open => {
                let timer = scheduler.schedule_after(now, self.config.close_after(), Task::MenuCloseEnd);
                self.state = MenuState::Closing { timer };
                doc.add_class(self.menu, &self.config.closing_class)?;
            }
            MenuState::Closing { timer } => {
                scheduler.cancel(timer);
                self.state = MenuState::Open;
                doc.remove_class(self.menu, &self.config.closing_class)?;
            }
        }
        tracing::debug!(message = "menu.toggle", state = ?self.state);
        self.sync_icon(doc)?;
        Ok(self.state)
    }

    /// The close transition finished.
    pub fn on_close_end<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<()> {
        if !matches!(self.state, MenuState::Closing { .. }) {
            return Ok(());
        }
        self.state = MenuState::Closed;
        doc.add_class(self.menu, &self.config.hidden_class)?;
        doc.remove_class(self.menu, &self.config.closing_class)?;
        Ok(())
    }

    /// Hide without the transition (outside click, `Escape`). Returns `false`
    /// if the menu was already closed.
    pub fn close_now<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
    ) -> Result<bool> {
        let was = self.state;
        if let MenuState::Closing { timer } = was {
            scheduler.cancel(timer);
            doc.remove_class(self.menu, &self.config.closing_class)?;
        }
        if was == MenuState::Closed {
            return Ok(false);
        }
        self.state = MenuState::Closed;
        tracing::debug!(message = "menu.close");
        doc.add_class(self.menu, &self.config.hidden_class)?;
        self.sync_icon(doc)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefx_core::memory::MemoryDocument;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Page {
        doc: MemoryDocument,
        button: ElementId,
        svg: ElementId,
        menu: ElementId,
        link: ElementId,
        outside: ElementId,
    }

    fn page() -> Page {
        let mut doc = MemoryDocument::default();
        let button = doc.element("button").id("mobile-menu-button").append();
        let svg = doc.element("svg").child_of(button).append();
        let menu = doc.element("div").id("mobile-menu").class("hidden").append();
        let link = doc.element("a").child_of(menu).append();
        let outside = doc.element("main").append();
        Page {
            doc,
            button,
            svg,
            menu,
            link,
            outside,
        }
    }

    fn attach(p: &Page) -> MobileMenu {
        MobileMenu::attach(MenuConfig::default(), &p.doc).expect("menu present")
    }

    #[test]
    fn open_then_close_with_transition() {
        let mut p = page();
        let mut menu = attach(&p);
        let mut sched = Scheduler::new();
        assert_eq!(menu.state(), MenuState::Closed);

        menu.on_click(&mut p.doc, &mut sched, ms(0), p.svg).expect("open");
        assert!(menu.is_open());
        assert!(!p.doc.has_class(p.menu, "hidden"));
        assert!(p.doc.has_class(p.menu, "mobile-menu-enter-active"));
        assert!(p.doc.has_class(p.svg, "rotate-90"));

        menu.on_click(&mut p.doc, &mut sched, ms(1000), p.button).expect("close");
        assert!(matches!(menu.state(), MenuState::Closing { .. }));
        assert!(p.doc.has_class(p.menu, "mobile-menu-enter"));
        assert!(!p.doc.has_class(p.svg, "rotate-90"));
        assert!(sched.pop_due(ms(1299)).is_none());

        let due = sched.pop_due(ms(1300)).expect("close end");
        assert_eq!(due.task, Task::MenuCloseEnd);
        menu.on_close_end(&mut p.doc).expect("end");
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(p.doc.has_class(p.menu, "hidden"));
        assert!(!p.doc.has_class(p.menu, "mobile-menu-enter"));
    }

    #[test]
    fn click_during_close_reopens() {
        let mut p = page();
        let mut menu = attach(&p);
        let mut sched = Scheduler::new();
        menu.toggle(&mut p.doc, &mut sched, ms(0)).expect("open");
        menu.toggle(&mut p.doc, &mut sched, ms(10)).expect("closing");
        let state = menu.toggle(&mut p.doc, &mut sched, ms(20)).expect("reopen");
        assert_eq!(state, MenuState::Open);
        assert_eq!(sched.pending_timers(), 0);
        assert!(!p.doc.has_class(p.menu, "hidden"));
        assert!(!p.doc.has_class(p.menu, "mobile-menu-enter"));
        assert!(p.doc.has_class(p.svg, "rotate-90"));
    }

    #[test]
    fn outside_click_closes_inside_click_does_not() {
        let mut p = page();
        let mut menu = attach(&p);
        let mut sched = Scheduler::new();
        menu.toggle(&mut p.doc, &mut sched, ms(0)).expect("open");

        let inside = menu.on_click(&mut p.doc, &mut sched, ms(5), p.link).expect("inside");
        assert_eq!(inside, MenuClick::Ignored);
        assert!(menu.is_open());

        let outside = menu.on_click(&mut p.doc, &mut sched, ms(6), p.outside).expect("outside");
        assert_eq!(outside, MenuClick::Dismissed);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(p.doc.has_class(p.menu, "hidden"));
        assert!(!p.doc.has_class(p.svg, "rotate-90"));
    }

    #[test]
    fn close_now_cancels_pending_close() {
        let mut p = page();
        let mut menu = attach(&p);
        let mut sched = Scheduler::new();
        menu.toggle(&mut p.doc, &mut sched, ms(0)).expect("open");
        menu.toggle(&mut p.doc, &mut sched, ms(0)).expect("closing");
        assert!(menu.close_now(&mut p.doc, &mut sched).expect("close"));
        assert_eq!(sched.pending_timers(), 0);
        assert!(!menu.close_now(&mut p.doc, &mut sched).expect("again"));
        // A stale end-of-close is a no-op.
        menu.on_close_end(&mut p.doc).expect("stale");
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn missing_elements_disable_menu() {
        let doc = MemoryDocument::default();
        assert!(MobileMenu::attach(MenuConfig::default(), &doc).is_none());
    }
}

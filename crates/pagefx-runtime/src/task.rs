#![forbid(unsafe_code)]

//! Deferred work items routed through the page [`Scheduler`](crate::scheduler::Scheduler).

use pagefx_core::ElementId;

use crate::notification::{NotificationId, NotificationStep};

/// A timer or frame callback, by what it does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Reveal one stagger child of an activated parent.
    RevealChild { parent: ElementId, child: ElementId },
    /// Advance a counter animation by one frame.
    CounterFrame(ElementId),
    /// Move a notification to its next phase.
    Notification {
        id: NotificationId,
        step: NotificationStep,
    },
    ThemeTransitionEnd,
    MenuCloseEnd,
    FormSubmitted,
    ScrollProgress,
    BackToTop,
    LoadingFade,
    LoadingHide,
    HeroIntro,
    /// Type the next character of the typewriter at this index.
    TypewriterTick(usize),
}

impl Task {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RevealChild { .. } => "reveal_child",
            Self::CounterFrame(_) => "counter_frame",
            Self::Notification { .. } => "notification",
            Self::ThemeTransitionEnd => "theme_transition_end",
            Self::MenuCloseEnd => "menu_close_end",
            Self::FormSubmitted => "form_submitted",
            Self::ScrollProgress => "scroll_progress",
            Self::BackToTop => "back_to_top",
            Self::LoadingFade => "loading_fade",
            Self::LoadingHide => "loading_hide",
            Self::HeroIntro => "hero_intro",
            Self::TypewriterTick(_) => "typewriter_tick",
        }
    }
}

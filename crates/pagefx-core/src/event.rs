#![forbid(unsafe_code)]

//! Page events delivered by the host.
//!
//! Events are plain data: the host translates its native event objects into
//! [`PageEvent`] values and hands them to the runtime one at a time. The serde
//! representation is the JSON wire form used by scripted hosts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// Submitted form field values keyed by field name.
pub type FormFields = BTreeMap<String, String>;

/// A key press with the modifier state the page cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPress {
    /// `KeyboardEvent.key` value, e.g. `"Escape"` or `"k"`.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    #[inline]
    #[must_use]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// An input event from the host environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    /// The window scrolled.
    Scroll,
    /// The window was resized.
    Resize,
    /// A click landed on `target` (the innermost element).
    Click { target: ElementId },
    /// A key went down anywhere in the document.
    Key(KeyPress),
    /// A form was submitted.
    Submit { form: ElementId, fields: FormFields },
    /// An element received focus.
    Focus { target: ElementId },
    /// An element lost focus.
    Blur { target: ElementId },
    /// The window `load` event fired.
    Load,
}

impl PageEvent {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Click { .. } => "click",
            Self::Key(_) => "key",
            Self::Submit { .. } => "submit",
            Self::Focus { .. } => "focus",
            Self::Blur { .. } => "blur",
            Self::Load => "load",
        }
    }
}

/// What the host should do with the native event after dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Call `preventDefault()` on the native event.
    pub prevent_default: bool,
}

impl EventOutcome {
    pub const NONE: Self = Self {
        prevent_default: false,
    };

    pub const PREVENT_DEFAULT: Self = Self {
        prevent_default: true,
    };

    /// Combine outcomes from several handlers.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

/// One element's visibility sample, as an `IntersectionObserverEntry` reports
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub element: ElementId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

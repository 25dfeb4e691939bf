#![forbid(unsafe_code)]

//! Visibility-driven page runtime.
//!
//! The core reveals elements as they scroll into view, runs eased numeric
//! counters, and shows transient notifications. Peripherals cover the theme
//! toggle, the mobile menu, the contact form, scroll indicators, the loading
//! screen, focus rings, lazy images and the typewriter effect.
//!
//! Everything is host-driven: [`PageRuntime`] never reads a clock or sleeps.
//! The host passes page time into every call and pumps timers and animation
//! frames through [`PageRuntime::advance`] and
//! [`PageRuntime::animation_frame`].
//!
//! ```
//! use std::time::Duration;
//! use pagefx_core::memory::MemoryDocument;
//! use pagefx_core::storage::MemoryStore;
//! use pagefx_core::{Document, Rect};
//! use pagefx_runtime::PageRuntime;
//!
//! let mut doc = MemoryDocument::default();
//! let card = doc
//!     .element("div")
//!     .class("fade-in-up")
//!     .rect(Rect::new(0.0, 100.0, 300.0, 200.0))
//!     .append();
//!
//! let mut page = PageRuntime::new(doc, MemoryStore::new());
//! page.boot(Duration::ZERO);
//! let released = page.observe(Duration::from_millis(16));
//! assert_eq!(released, vec![card]);
//! assert!(page.document().has_class(card, "is-visible"));
//! ```

pub mod config;
pub mod counter;
pub mod debounce;
pub mod error;
pub mod focus;
pub mod form;
pub mod keyboard;
pub mod lazy_image;
pub mod loading;
pub mod menu;
pub mod notification;
pub mod page;
pub mod reveal;
pub mod scheduler;
pub mod scroll;
pub mod task;
pub mod theme;
pub mod typewriter;
pub mod visibility;

pub use config::PageConfig;
pub use error::{PageError, Result};
pub use notification::{NotificationCenter, NotificationId, NotificationPhase, Severity};
pub use page::{BootReport, PageRuntime};
pub use scheduler::{Scheduler, TimerId};
pub use theme::Theme;
pub use visibility::{ActivationEvent, VisibilityWatcher, WatchStatus};

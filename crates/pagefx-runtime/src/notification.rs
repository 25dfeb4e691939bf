#![forbid(unsafe_code)]

//! Transient notification banners.
//!
//! Every [`NotificationCenter::notify`] call creates its own banner and runs
//! an independent timeline, one timer per transition:
//!
//! ```text
//! t              t+enter           t+display          t+display+exit
//! │ Entering ────▶ Visible ────────▶ Leaving ─────────▶ Removed
//! │ (off-screen)   (slide in)        (slide out)        (node removed)
//! ```
//!
//! # Invariants
//!
//! 1. Banners never interact: no cap, no dedup, no queueing.
//! 2. Phases only move forward.
//! 3. A removed banner is dropped from [`NotificationCenter::active`].

use std::fmt;
use std::time::Duration;

use pagefx_core::{Document, ElementId};
use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::Task;

/// Banner style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Parse a severity name; anything unknown is `Info`.
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationPhase {
    Entering,
    Visible,
    Leaving,
    Removed,
}

/// Transition carried by a [`Task::Notification`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationStep {
    SlideIn,
    SlideOut,
    Remove,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Duration,
    pub element: ElementId,
    pub phase: NotificationPhase,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    config: NotificationConfig,
    next_id: u64,
    live: Vec<Notification>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            next_id: 0,
            live: Vec::new(),
        }
    }

    fn severity_classes(&self, severity: Severity) -> &str {
        match severity {
            Severity::Info => &self.config.info_classes,
            Severity::Success => &self.config.success_classes,
            Severity::Error => &self.config.error_classes,
        }
    }

    /// Create a banner off-screen and start its timeline.
    pub fn notify<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
        message: &str,
        severity: Severity,
    ) -> Result<NotificationId> {
        let element = doc.create_element("div")?;
        doc.set_text(element, message)?;
        doc.append_to_body(element)?;
        doc.add_classes(element, &self.config.base_classes)?;
        doc.add_classes(element, self.severity_classes(severity))?;

        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.live.push(Notification {
            id,
            message: message.to_string(),
            severity,
            created_at: now,
            element,
            phase: NotificationPhase::Entering,
        });
        scheduler.schedule_after(
            now,
            self.config.enter_after(),
            Task::Notification {
                id,
                step: NotificationStep::SlideIn,
            },
        );
        tracing::debug!(
            message = "notify.create",
            id = id.get(),
            severity = severity.as_str(),
            element = element.get()
        );
        Ok(id)
    }

    /// Apply a fired transition.
    pub fn advance<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
        id: NotificationId,
        step: NotificationStep,
    ) -> Result<()> {
        let Some(index) = self.live.iter().position(|n| n.id == id) else {
            return Ok(());
        };
        let element = self.live[index].element;
        match step {
            NotificationStep::SlideIn => {
                self.live[index].phase = NotificationPhase::Visible;
                scheduler.schedule_after(
                    now,
                    self.config.hold_after(),
                    Task::Notification {
                        id,
                        step: NotificationStep::SlideOut,
                    },
                );
                tracing::debug!(message = "notify.slide_in", id = id.get());
                doc.remove_class(element, &self.config.offscreen_class)?;
            }
            NotificationStep::SlideOut => {
                self.live[index].phase = NotificationPhase::Leaving;
                scheduler.schedule_after(
                    now,
                    self.config.exit_after(),
                    Task::Notification {
                        id,
                        step: NotificationStep::Remove,
                    },
                );
                tracing::debug!(message = "notify.slide_out", id = id.get());
                doc.add_class(element, &self.config.offscreen_class)?;
            }
            NotificationStep::Remove => {
                self.live.remove(index);
                tracing::debug!(message = "notify.remove", id = id.get());
                doc.remove(element)?;
            }
        }
        Ok(())
    }

    /// Live banners, oldest first.
    #[must_use]
    pub fn active(&self) -> &[Notification] {
        &self.live
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.live.iter().find(|n| n.id == id)
    }

    /// Phase of a banner; `Removed` once it left the document.
    #[must_use]
    pub fn phase(&self, id: NotificationId) -> Option<NotificationPhase> {
        match self.get(id) {
            Some(n) => Some(n.phase),
            None if id.0 < self.next_id => Some(NotificationPhase::Removed),
            None => None,
        }
    }

    /// Remove every live banner (teardown). Keeps going past failures and
    /// reports the first one.
    pub fn clear<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<()> {
        let mut first_err = None;
        for n in self.live.drain(..) {
            if let Err(err) = doc.remove(n.element) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#![forbid(unsafe_code)]

//! Light/dark theme persisted in a key-value store.
//!
//! The current theme lives in [`ThemeController::theme`]; the root element's
//! class and the icon text are derived from it and never read back.

use std::fmt;

use pagefx_core::storage::KeyValueStore;
use pagefx_core::{Document, ElementId};
use serde::{Deserialize, Serialize};

use crate::config::ThemeConfig;
use crate::error::Result;
use crate::scheduler::{Scheduler, TimerId};
use crate::task::Task;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Stored value to theme. Anything other than `light` is dark.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ThemeController {
    config: ThemeConfig,
    theme: Theme,
    toggle: Option<ElementId>,
    icon: Option<ElementId>,
    transition: Option<TimerId>,
}

impl ThemeController {
    /// Read the stored preference and apply it to the document.
    pub fn init<D, S>(config: ThemeConfig, doc: &mut D, store: &S) -> Result<Self>
    where
        D: Document + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        let stored = match store.get(&config.storage_key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(message = "theme.read_failed", error = %err);
                None
            }
        };
        let controller = Self {
            theme: Theme::from_stored(stored.as_deref()),
            toggle: doc.element_by_id(&config.toggle_id),
            icon: doc.element_by_id(&config.icon_id),
            transition: None,
            config,
        };
        controller.apply(doc)?;
        tracing::debug!(message = "theme.init", theme = controller.theme.as_str());
        Ok(controller)
    }

    #[inline]
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether a click on `target` belongs to the toggle button.
    #[must_use]
    pub fn is_toggle<D: Document + ?Sized>(&self, doc: &D, target: ElementId) -> bool {
        self.toggle.is_some_and(|t| doc.contains(t, target))
    }

    fn apply<D: Document + ?Sized>(&self, doc: &mut D) -> Result<()> {
        let root = doc.root();
        match self.theme {
            Theme::Light => doc.add_class(root, &self.config.light_class)?,
            Theme::Dark => doc.remove_class(root, &self.config.light_class)?,
        }
        if let Some(icon) = self.icon {
            let glyph = match self.theme {
                Theme::Light => &self.config.light_icon,
                Theme::Dark => &self.config.dark_icon,
            };
            doc.set_text(icon, glyph)?;
        }
        Ok(())
    }

    /// Flip the theme, persist it and start the transition window.
    pub fn toggle<D, S>(
        &mut self,
        doc: &mut D,
        store: &mut S,
        scheduler: &mut Scheduler<Task>,
        now: std::time::Duration,
    ) -> Result<Theme>
    where
        D: Document + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        self.theme = self.theme.toggled();
        if let Err(err) = store.set(&self.config.storage_key, self.theme.as_str()) {
            tracing::warn!(message = "theme.persist_failed", error = %err);
        }
        if let Some(old) = self.transition.take() {
            scheduler.cancel(old);
        }
        self.transition = Some(scheduler.schedule_after(
            now,
            self.config.transition_after(),
            Task::ThemeTransitionEnd,
        ));
        tracing::debug!(message = "theme.toggle", theme = self.theme.as_str());
        doc.add_class(doc.root(), &self.config.transition_class)?;
        self.apply(doc)?;
        Ok(self.theme)
    }

    pub fn on_transition_end<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<()> {
        self.transition = None;
        doc.remove_class(doc.root(), &self.config.transition_class)?;
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! Loading screen fade-out and hero intro.

use std::time::Duration;

use pagefx_core::{Document, ElementId};

use crate::config::LoadingConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct LoadingScreen {
    config: LoadingConfig,
    screen: Option<ElementId>,
    hero: Option<ElementId>,
    loaded_at: Option<Duration>,
}

impl LoadingScreen {
    #[must_use]
    pub fn attach<D: Document + ?Sized>(config: LoadingConfig, doc: &D) -> Self {
        Self {
            screen: doc.element_by_id(&config.loading_screen_id),
            hero: doc.element_by_id(&config.hero_id),
            loaded_at: None,
            config,
        }
    }

    /// Boot-time work: schedule the hero intro.
    pub fn boot(&self, scheduler: &mut Scheduler<Task>, now: Duration) {
        if self.hero.is_some() {
            scheduler.schedule_after(now, self.config.hero_after(), Task::HeroIntro);
        }
    }

    /// The window `load` event. Returns `false` for a repeated load.
    pub fn on_load<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
    ) -> Result<bool> {
        if self.loaded_at.is_some() {
            return Ok(false);
        }
        self.loaded_at = Some(now);
        tracing::info!(
            message = "page.loaded",
            load_time_ms = now.as_millis() as u64
        );
        if self.screen.is_some() {
            scheduler.schedule_after(now, self.config.fade_after(), Task::LoadingFade);
        }
        doc.add_class(doc.body(), &self.config.loaded_class)?;
        Ok(true)
    }

    #[must_use]
    pub fn loaded_at(&self) -> Option<Duration> {
        self.loaded_at
    }

    pub fn on_fade<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
    ) -> Result<()> {
        let Some(screen) = self.screen else {
            return Ok(());
        };
        scheduler.schedule_after(now, self.config.hide_after(), Task::LoadingHide);
        doc.set_style(screen, "opacity", "0")?;
        Ok(())
    }

    pub fn on_hide<D: Document + ?Sized>(&self, doc: &mut D) -> Result<()> {
        if let Some(screen) = self.screen {
            doc.set_style(screen, "display", "none")?;
        }
        Ok(())
    }

    pub fn on_hero<D: Document + ?Sized>(&self, doc: &mut D) -> Result<()> {
        if let Some(hero) = self.hero {
            doc.set_style(hero, "transform", "translateX(0)")?;
            doc.set_style(hero, "opacity", "1")?;
        }
        Ok(())
    }
}

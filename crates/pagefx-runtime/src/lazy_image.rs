#![forbid(unsafe_code)]

//! Deferred image loading.
//!
//! Images carrying the source attribute are watched by their own
//! [`VisibilityWatcher`] (threshold 0, no margin). The first intersection
//! copies the deferred source into `src`, drops the lazy class and releases
//! the image.

use std::time::Duration;

use pagefx_core::{BehaviorTags, Document, ElementId, IntersectionEntry, Selector};

use crate::config::LazyImageConfig;
use crate::error::Result;
use crate::visibility::{VisibilityWatcher, WatcherOptions};

#[derive(Debug, Clone)]
pub struct LazyImages {
    config: LazyImageConfig,
    watcher: VisibilityWatcher,
    loaded: Vec<ElementId>,
}

impl LazyImages {
    #[must_use]
    pub fn new(config: LazyImageConfig) -> Self {
        Self {
            config,
            watcher: VisibilityWatcher::new(WatcherOptions::default()),
            loaded: Vec::new(),
        }
    }

    /// Selector for deferred images.
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector::tag("img").and(Selector::attribute(self.config.source_attribute.clone()))
    }

    /// Register every deferred image. Returns them for host-side observers.
    pub fn register<D: Document + ?Sized>(&mut self, doc: &D) -> Vec<ElementId> {
        let images = doc.query_all(&self.selector());
        for &img in &images {
            self.watcher.observe(img, BehaviorTags::empty());
        }
        tracing::debug!(message = "lazy.register", images = images.len());
        images
    }

    #[inline]
    #[must_use]
    pub fn watcher(&self) -> &VisibilityWatcher {
        &self.watcher
    }

    /// Images loaded so far, in load order.
    #[must_use]
    pub fn loaded(&self) -> &[ElementId] {
        &self.loaded
    }

    /// Process host samples. Returns the released images.
    pub fn observe_batch<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        entries: &[IntersectionEntry],
        now: Duration,
    ) -> Result<Vec<ElementId>> {
        let events = self.watcher.observe_batch(entries, now);
        self.load_all(doc, events.iter().map(|e| e.element).collect())
    }

    /// Geometry scan for hosts without an observer.
    pub fn scan<D: Document + ?Sized>(&mut self, doc: &mut D, now: Duration) -> Result<Vec<ElementId>> {
        let events = self.watcher.scan(doc, now);
        self.load_all(doc, events.iter().map(|e| e.element).collect())
    }

    fn load_all<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        images: Vec<ElementId>,
    ) -> Result<Vec<ElementId>> {
        let mut first_err = None;
        for &img in &images {
            if let Err(err) = self.load(doc, img) {
                first_err.get_or_insert(err);
            }
        }
        for &img in &images {
            self.watcher.release(img);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(images),
        }
    }

    fn load<D: Document + ?Sized>(&mut self, doc: &mut D, img: ElementId) -> Result<()> {
        if let Some(src) = doc.attribute(img, &self.config.source_attribute) {
            doc.set_attribute(img, "src", &src)?;
        }
        doc.remove_class(img, &self.config.lazy_class)?;
        self.loaded.push(img);
        tracing::debug!(message = "lazy.load", image = img.get());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.watcher.clear();
    }
}

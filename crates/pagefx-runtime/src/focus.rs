#![forbid(unsafe_code)]

//! Focus ring on interactive elements.

use pagefx_core::{Document, ElementId, Selector};

use crate::config::FocusConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FocusRing {
    focusable: Selector,
    ring_classes: String,
}

impl FocusRing {
    #[must_use]
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            focusable: Selector::any_tag(config.focusable_tags.iter().map(String::as_str)),
            ring_classes: config.ring_classes.clone(),
        }
    }

    /// Whether `element` gets a ring.
    #[must_use]
    pub fn applies_to<D: Document + ?Sized>(&self, doc: &D, element: ElementId) -> bool {
        doc.matches(element, &self.focusable)
    }

    pub fn on_focus<D: Document + ?Sized>(&self, doc: &mut D, target: ElementId) -> Result<()> {
        if self.applies_to(doc, target) {
            doc.add_classes(target, &self.ring_classes)?;
        }
        Ok(())
    }

    pub fn on_blur<D: Document + ?Sized>(&self, doc: &mut D, target: ElementId) -> Result<()> {
        if self.applies_to(doc, target) {
            doc.remove_classes(target, &self.ring_classes)?;
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! Typewriter text effect.
//!
//! Elements with the text attribute are emptied at boot and retyped one
//! character per tick. The first character appears immediately.

use std::time::Duration;

use pagefx_core::{Document, ElementId, Selector};

use crate::config::TypewriterConfig;
use crate::error::{PageError, Result};
use crate::scheduler::Scheduler;
use crate::task::Task;

#[derive(Debug, Clone)]
struct Line {
    element: ElementId,
    chars: Vec<char>,
    typed: usize,
}

impl Line {
    fn is_done(&self) -> bool {
        self.typed >= self.chars.len()
    }
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    interval: Duration,
    lines: Vec<Line>,
}

impl Typewriter {
    /// Collect typewriter elements. Elements with empty text are skipped.
    #[must_use]
    pub fn attach<D: Document + ?Sized>(config: &TypewriterConfig, doc: &D) -> Self {
        let lines = doc
            .query_all(&Selector::attribute(config.text_attribute.clone()))
            .into_iter()
            .filter_map(|element| {
                let text = doc.attribute(element, &config.text_attribute)?;
                (!text.is_empty()).then(|| Line {
                    element,
                    chars: text.chars().collect(),
                    typed: 0,
                })
            })
            .collect();
        Self {
            interval: config.char_interval(),
            lines,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clear every element and type its first character.
    ///
    /// A line that cannot be cleared is skipped; the others still start.
    /// Returns the first failure.
    pub fn boot<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
    ) -> Result<()> {
        let mut first_err = None;
        for index in 0..self.lines.len() {
            let started = doc
                .set_text(self.lines[index].element, "")
                .map_err(PageError::from)
                .and_then(|()| self.tick(doc, scheduler, now, index));
            if let Err(err) = started {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Type the next character of line `index`.
    pub fn tick<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
        index: usize,
    ) -> Result<()> {
        let Some(line) = self.lines.get_mut(index) else {
            return Ok(());
        };
        if line.is_done() {
            return Ok(());
        }
        line.typed += 1;
        let shown: String = line.chars[..line.typed].iter().collect();
        if !line.is_done() {
            scheduler.schedule_after(now, self.interval, Task::TypewriterTick(index));
        }
        doc.set_text(line.element, &shown)?;
        Ok(())
    }

    /// Whether every line finished typing.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.lines.iter().all(Line::is_done)
    }
}

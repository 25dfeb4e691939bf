#![forbid(unsafe_code)]

//! Core: element identity, geometry, page events, and the document surface.
//!
//! Nothing in this crate talks to a browser. The [`document::Document`] and
//! [`storage::KeyValueStore`] traits describe what the runtime needs from its
//! host; [`memory::MemoryDocument`] and [`storage::MemoryStore`] implement them
//! in memory for native hosts and tests.

pub mod animation;
pub mod clock;
pub mod document;
pub mod element;
pub mod event;
pub mod format;
pub mod geometry;
pub mod memory;
pub mod storage;

pub use document::{DomError, DomResult, Document};
pub use element::{BehaviorTags, ElementId, Selector};
pub use event::{EventOutcome, FormFields, IntersectionEntry, KeyPress, PageEvent};
pub use geometry::{Rect, RootMargin, Viewport};

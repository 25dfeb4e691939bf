#![forbid(unsafe_code)]

//! The document query/mutation surface.
//!
//! [`Document`] is everything the runtime may do to a page: enumerate
//! elements matching a [`Selector`], toggle presentation classes, read and
//! write attributes, text and inline style, create/insert/remove nodes, and
//! read geometry. The browser binding implements it over `web_sys`; the
//! in-memory [`MemoryDocument`](crate::memory::MemoryDocument) implements it
//! for native hosts and tests.
//!
//! Queries are infallible and return elements in document order. Mutations
//! return [`DomResult`]: a stale handle or a host-side failure surfaces as a
//! [`DomError`] that the caller propagates with `?`.

use thiserror::Error;

use crate::element::{ElementId, Selector};
use crate::geometry::{Rect, Viewport};

/// Failure of a document mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle does not name a node that is still in the document.
    #[error("element {0} is not attached to the document")]
    Detached(ElementId),

    /// The host rejected the operation.
    #[error("host error: {0}")]
    Host(String),
}

pub type DomResult<T> = Result<T, DomError>;

/// Host document operations.
pub trait Document {
    /// The document element (`<html>`).
    fn root(&self) -> ElementId;

    /// The `<body>` element.
    fn body(&self) -> ElementId;

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// Every attached element matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<ElementId>;

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in
    /// document order.
    fn query_within(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId>;

    /// First attached element matching `selector`.
    fn query_first(&self, selector: &Selector) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `scope` matching `selector`.
    fn query_first_within(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        self.query_within(scope, selector).into_iter().next()
    }

    /// Inclusive containment, like `Node.contains`.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    /// Lowercase tag name, or `None` for a detached handle.
    fn tag_name(&self, element: ElementId) -> Option<String>;

    /// Whether `element` matches `selector`.
    fn matches(&self, element: ElementId, selector: &Selector) -> bool;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str) -> DomResult<()>;

    fn remove_class(&mut self, element: ElementId, class: &str) -> DomResult<()>;

    /// Add every whitespace-separated class in `classes`.
    fn add_classes(&mut self, element: ElementId, classes: &str) -> DomResult<()> {
        for class in classes.split_whitespace() {
            self.add_class(element, class)?;
        }
        Ok(())
    }

    /// Remove every whitespace-separated class in `classes`.
    fn remove_classes(&mut self, element: ElementId, classes: &str) -> DomResult<()> {
        for class in classes.split_whitespace() {
            self.remove_class(element, class)?;
        }
        Ok(())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> DomResult<()>;

    /// Text content.
    fn text(&self, element: ElementId) -> Option<String>;

    /// Replace the text content.
    fn set_text(&mut self, element: ElementId, text: &str) -> DomResult<()>;

    /// Set one inline style property.
    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> DomResult<()>;

    /// Set the `disabled` state of a form control.
    fn set_disabled(&mut self, element: ElementId, disabled: bool) -> DomResult<()>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> DomResult<ElementId>;

    /// Append an element as the last child of `<body>`.
    fn append_to_body(&mut self, element: ElementId) -> DomResult<()>;

    /// Remove an element (and its subtree) from the document.
    fn remove(&mut self, element: ElementId) -> DomResult<()>;

    /// Reset a form's controls to their initial values.
    fn reset_form(&mut self, form: ElementId) -> DomResult<()>;

    /// Viewport-relative bounding rectangle, or `None` for a detached handle.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Current viewport size and scroll position.
    fn viewport(&self) -> Viewport;

    /// Scroll the window to the top.
    fn scroll_to_top(&mut self, smooth: bool) -> DomResult<()>;
}

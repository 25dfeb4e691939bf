#![forbid(unsafe_code)]

//! In-memory [`Document`] for native hosts and tests.
//!
//! `MemoryDocument` is a small arena-backed node tree with just enough
//! behavior to stand in for a browser page: classes, attributes, text, inline
//! style, a disabled flag, page-space layout rectangles and a scrollable
//! viewport. Rectangles are stored in page coordinates and reported
//! viewport-relative by [`Document::bounding_rect`], so scrolling the viewport
//! moves every element the way `getBoundingClientRect` would.
//!
//! # Usage
//!
//! ```
//! use pagefx_core::memory::MemoryDocument;
//! use pagefx_core::{Document, Rect, Selector, Viewport};
//!
//! let mut doc = MemoryDocument::new(Viewport::new(1024.0, 768.0));
//! let card = doc
//!     .element("div")
//!     .class("fade-in-up")
//!     .rect(Rect::new(0.0, 1200.0, 400.0, 300.0))
//!     .append();
//! assert_eq!(doc.query_all(&Selector::class("fade-in-up")), vec![card]);
//! ```

use std::collections::BTreeMap;

use crate::document::{DomError, DomResult, Document};
use crate::element::{ElementId, Selector};
use crate::geometry::{Rect, Viewport};

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    disabled: bool,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    attached: bool,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: ElementId,
    body: ElementId,
    viewport: Viewport,
    form_resets: Vec<ElementId>,
    scroll_requests: Vec<bool>,
}

impl MemoryDocument {
    /// An empty page (`<html><body></body></html>`) with the given viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let mut root = Node::new("html");
        root.attached = true;
        let mut body = Node::new("body");
        body.attached = true;
        body.parent = Some(ElementId::new(0));
        root.children.push(ElementId::new(1));
        Self {
            nodes: vec![root, body],
            root: ElementId::new(0),
            body: ElementId::new(1),
            viewport,
            form_resets: Vec::new(),
            scroll_requests: Vec::new(),
        }
    }

    /// Start building an element; finish with [`ElementBuilder::append`].
    pub fn element(&mut self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            doc: self,
            node: Node::new(tag),
            parent: None,
        }
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.get() as usize)
    }

    fn attached(&self, element: ElementId) -> Option<&Node> {
        self.node(element).filter(|n| n.attached)
    }

    fn attached_mut(&mut self, element: ElementId) -> DomResult<&mut Node> {
        self.nodes
            .get_mut(element.get() as usize)
            .filter(|n| n.attached)
            .ok_or(DomError::Detached(element))
    }

    fn push_node(&mut self, node: Node) -> ElementId {
        let id = ElementId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn set_attached(&mut self, element: ElementId, attached: bool) {
        let mut stack = vec![element];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.get() as usize) {
                node.attached = attached;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(node) = self.attached(scope) else {
            return out;
        };
        let mut stack: Vec<ElementId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(child) = self.node(id) {
                stack.extend(child.children.iter().rev().copied());
            }
        }
        out
    }

    fn node_matches(node: &Node, selector: &Selector) -> bool {
        let has_attribute = |name: &str| node.attributes.contains_key(name);
        selector.matches(
            &node.tag,
            node.classes.iter().map(String::as_str),
            &has_attribute,
        )
    }

    // ── Host-side controls ───────────────────────────────────────────

    /// Scroll the viewport to `y` (clamped to the scrollable range).
    pub fn set_scroll_y(&mut self, y: f64) {
        self.viewport.scroll_y = y.clamp(0.0, self.viewport.max_scroll());
    }

    /// Set the total scrollable height.
    pub fn set_scroll_height(&mut self, height: f64) {
        self.viewport.scroll_height = height;
    }

    /// Resize the viewport.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    /// Move an element to a new page-space rectangle.
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(element.get() as usize) {
            node.rect = rect;
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Class list of an element (empty for unknown handles).
    #[must_use]
    pub fn classes(&self, element: ElementId) -> Vec<&str> {
        self.node(element)
            .map(|n| n.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Inline style property value.
    #[must_use]
    pub fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.node(element)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_attached(&self, element: ElementId) -> bool {
        self.attached(element).is_some()
    }

    #[must_use]
    pub fn is_disabled(&self, element: ElementId) -> bool {
        self.node(element).is_some_and(|n| n.disabled)
    }

    /// Direct children of an element, in order.
    #[must_use]
    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.node(element)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Forms reset so far, in order.
    #[must_use]
    pub fn form_resets(&self) -> &[ElementId] {
        &self.form_resets
    }

    /// Scroll-to-top requests so far (`true` = smooth).
    #[must_use]
    pub fn scroll_requests(&self) -> &[bool] {
        &self.scroll_requests
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(Viewport::new(1280.0, 800.0))
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementId {
        self.root
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.query_all(&Selector::attribute("id"))
            .into_iter()
            .find(|&el| self.attribute(el, "id").as_deref() == Some(id))
    }

    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        let root = self.root;
        let mut out: Vec<ElementId> = Vec::new();
        if self.attached(root).is_some_and(|n| Self::node_matches(n, selector)) {
            out.push(root);
        }
        out.extend(self.query_within(root, selector));
        out
    }

    fn query_within(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(|n| Self::node_matches(n, selector)))
            .collect()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.attached(element).map(|n| n.tag.clone())
    }

    fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        self.attached(element)
            .is_some_and(|n| Self::node_matches(n, selector))
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> DomResult<()> {
        let node = self.attached_mut(element)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> DomResult<()> {
        let node = self.attached_mut(element)?;
        node.classes.retain(|c| c != class);
        Ok(())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)
            .and_then(|n| n.attributes.get(name))
            .cloned()
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> DomResult<()> {
        let node = self.attached_mut(element)?;
        node.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn text(&self, element: ElementId) -> Option<String> {
        self.node(element).map(|n| n.text.clone())
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> DomResult<()> {
        // Detached nodes are still writable, as in a real DOM.
        let node = self
            .nodes
            .get_mut(element.get() as usize)
            .ok_or(DomError::Detached(element))?;
        node.text = text.to_string();
        Ok(())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> DomResult<()> {
        let node = self.attached_mut(element)?;
        node.styles.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) -> DomResult<()> {
        self.attached_mut(element)?.disabled = disabled;
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> DomResult<ElementId> {
        Ok(self.push_node(Node::new(tag)))
    }

    fn append_to_body(&mut self, element: ElementId) -> DomResult<()> {
        if element == self.root || element == self.body {
            return Err(DomError::Host(format!("cannot append {element} to body")));
        }
        let body = self.body;
        let previous_parent = {
            let node = self
                .nodes
                .get_mut(element.get() as usize)
                .ok_or(DomError::Detached(element))?;
            node.parent.replace(body)
        };
        if let Some(parent) = previous_parent {
            if let Some(p) = self.nodes.get_mut(parent.get() as usize) {
                p.children.retain(|&c| c != element);
            }
        }
        self.nodes[body.get() as usize].children.push(element);
        self.set_attached(element, true);
        Ok(())
    }

    fn remove(&mut self, element: ElementId) -> DomResult<()> {
        if element == self.root || element == self.body {
            return Err(DomError::Host(format!("cannot remove {element}")));
        }
        let parent = self.attached_mut(element)?.parent.take();
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(parent.get() as usize) {
                p.children.retain(|&c| c != element);
            }
        }
        self.set_attached(element, false);
        Ok(())
    }

    fn reset_form(&mut self, form: ElementId) -> DomResult<()> {
        self.attached_mut(form)?;
        self.form_resets.push(form);
        Ok(())
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.attached(element)
            .map(|n| n.rect.offset_y(-self.viewport.scroll_y))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to_top(&mut self, smooth: bool) -> DomResult<()> {
        self.viewport.scroll_y = 0.0;
        self.scroll_requests.push(smooth);
        Ok(())
    }
}

/// Builder for an element appended to a [`MemoryDocument`].
pub struct ElementBuilder<'a> {
    doc: &'a mut MemoryDocument,
    node: Node,
    parent: Option<ElementId>,
}

impl ElementBuilder<'_> {
    /// Set the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add one or more whitespace-separated classes.
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.node.classes.iter().any(|c| c == class) {
                self.node.classes.push(class.to_string());
            }
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_string();
        self
    }

    /// Page-space layout rectangle.
    #[must_use]
    pub fn rect(mut self, rect: Rect) -> Self {
        self.node.rect = rect;
        self
    }

    /// Append under `parent` instead of `<body>`.
    #[must_use]
    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach the element and return its handle.
    pub fn append(self) -> ElementId {
        let ElementBuilder {
            doc,
            mut node,
            parent,
        } = self;
        let parent = parent.unwrap_or(doc.body);
        node.parent = Some(parent);
        node.attached = doc.node(parent).is_some_and(|p| p.attached);
        let id = doc.push_node(node);
        if let Some(p) = doc.nodes.get_mut(parent.get() as usize) {
            p.children.push(id);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page() -> MemoryDocument {
        MemoryDocument::new(Viewport::new(1000.0, 800.0))
    }

    #[test]
    fn query_is_document_order() {
        let mut doc = page();
        let a = doc.element("section").class("x").append();
        let a1 = doc.element("div").class("x").child_of(a).append();
        let b = doc.element("section").class("x").append();
        let a2 = doc.element("div").class("x").child_of(a).append();
        assert_eq!(doc.query_all(&Selector::class("x")), vec![a, a1, a2, b]);
        assert_eq!(doc.query_within(a, &Selector::class("x")), vec![a1, a2]);
    }

    #[test]
    fn element_by_id_finds_attached_only() {
        let mut doc = page();
        let el = doc.element("button").id("theme-toggle").append();
        assert_eq!(doc.element_by_id("theme-toggle"), Some(el));
        doc.remove(el).expect("remove");
        assert_eq!(doc.element_by_id("theme-toggle"), None);
    }

    #[test]
    fn classes_are_a_set() {
        let mut doc = page();
        let el = doc.element("div").class("a a b").append();
        doc.add_class(el, "b").expect("add");
        assert_eq!(doc.classes(el), vec!["a", "b"]);
        doc.remove_classes(el, "a b").expect("remove");
        assert!(doc.classes(el).is_empty());
    }

    #[test]
    fn mutating_detached_node_fails() {
        let mut doc = page();
        let el = doc.element("div").append();
        doc.remove(el).expect("remove");
        assert_eq!(doc.add_class(el, "x"), Err(DomError::Detached(el)));
        assert_eq!(doc.remove(el), Err(DomError::Detached(el)));
    }

    #[test]
    fn created_elements_attach_on_append() {
        let mut doc = page();
        let el = doc.create_element("div").expect("create");
        assert!(!doc.is_attached(el));
        doc.set_text(el, "hello").expect("text on detached node");
        doc.append_to_body(el).expect("append");
        assert!(doc.is_attached(el));
        assert_eq!(doc.children(doc.body()).last(), Some(&el));
        assert_eq!(doc.text(el).as_deref(), Some("hello"));
    }

    #[test]
    fn removal_detaches_subtree() {
        let mut doc = page();
        let parent = doc.element("div").append();
        let child = doc.element("span").child_of(parent).append();
        doc.remove(parent).expect("remove");
        assert!(!doc.is_attached(child));
        assert!(doc.query_all(&Selector::tag("span")).is_empty());
    }

    #[test]
    fn bounding_rect_follows_scroll() {
        let mut doc = page();
        doc.set_scroll_height(3000.0);
        let el = doc
            .element("div")
            .rect(Rect::new(0.0, 1000.0, 100.0, 100.0))
            .append();
        assert_eq!(doc.bounding_rect(el).map(|r| r.y), Some(1000.0));
        doc.set_scroll_y(600.0);
        assert_eq!(doc.bounding_rect(el).map(|r| r.y), Some(400.0));
    }

    #[test]
    fn scroll_is_clamped() {
        let mut doc = page();
        doc.set_scroll_height(1000.0);
        doc.set_scroll_y(5000.0);
        assert_eq!(doc.viewport().scroll_y, 200.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let mut doc = page();
        let button = doc.element("button").append();
        let svg = doc.element("svg").child_of(button).append();
        assert!(doc.contains(button, svg));
        assert!(doc.contains(button, button));
        assert!(!doc.contains(svg, button));
    }
}

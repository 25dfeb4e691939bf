#![forbid(unsafe_code)]

//! [`Document`] over the live browser DOM.
//!
//! Element handles are indices into a registry of `web_sys::Element`s. An
//! element is registered the first time a query returns it or an event
//! targets it, and is tagged with a `data-pagefx-id` attribute so later
//! lookups find the same handle.

use std::cell::RefCell;

use pagefx_core::{DomError, DomResult, Document, ElementId, FormFields, Rect, Selector, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, NodeList, ScrollBehavior, ScrollToOptions, Window,
};

const ID_ATTR: &str = "data-pagefx-id";

pub(crate) fn host_error(context: &str, err: &JsValue) -> DomError {
    DomError::Host(format!("{context}: {err:?}"))
}

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    root: ElementId,
    body: ElementId,
    nodes: RefCell<Vec<Element>>,
}

impl WebDocument {
    /// Bind to the current window's document.
    pub fn from_window() -> DomResult<Self> {
        let window = web_sys::window().ok_or_else(|| DomError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Host("no document".into()))?;
        let html = document
            .document_element()
            .ok_or_else(|| DomError::Host("no document element".into()))?;
        let body: Element = document
            .body()
            .ok_or_else(|| DomError::Host("no body".into()))?
            .into();

        let this = Self {
            window,
            document,
            root: ElementId::new(0),
            body: ElementId::new(0),
            nodes: RefCell::new(Vec::new()),
        };
        let root = this.id_for(&html);
        let body = this.id_for(&body);
        Ok(Self { root, body, ..this })
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Handle for `element`, registering it on first sight.
    pub fn id_for(&self, element: &Element) -> ElementId {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(raw) = element
            .get_attribute(ID_ATTR)
            .and_then(|v| v.parse::<u32>().ok())
        {
            if nodes.get(raw as usize) == Some(element) {
                return ElementId::new(raw);
            }
        }
        let id = ElementId::new(nodes.len() as u32);
        // Tagging is best effort; lookups fall back to re-registration.
        let _ = element.set_attribute(ID_ATTR, &id.get().to_string());
        nodes.push(element.clone());
        id
    }

    /// The DOM element behind a handle.
    pub fn element(&self, id: ElementId) -> DomResult<Element> {
        self.nodes
            .borrow()
            .get(id.get() as usize)
            .cloned()
            .ok_or(DomError::Detached(id))
    }

    fn attached(&self, id: ElementId) -> Option<Element> {
        let element = self.element(id).ok()?;
        element.is_connected().then_some(element)
    }

    fn html(&self, id: ElementId) -> DomResult<HtmlElement> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| DomError::Host(format!("{id} is not an HTML element")))
    }

    fn collect(&self, list: Result<NodeList, JsValue>) -> Vec<ElementId> {
        let Ok(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| self.id_for(&el))
            .collect()
    }

    /// Named control values of a form, keyed by `name`.
    #[must_use]
    pub fn form_fields(&self, form: &HtmlFormElement) -> FormFields {
        let mut fields = FormFields::new();
        let Ok(list) = form.query_selector_all("[name]") else {
            return fields;
        };
        for node in (0..list.length()).filter_map(|i| list.get(i)) {
            let value = if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
                Some((input.name(), input.value()))
            } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
                Some((area.name(), area.value()))
            } else {
                node.dyn_ref::<HtmlSelectElement>()
                    .map(|select| (select.name(), select.value()))
            };
            if let Some((name, value)) = value {
                fields.insert(name, value);
            }
        }
        fields
    }
}

impl Document for WebDocument {
    fn root(&self) -> ElementId {
        self.root
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document
            .get_element_by_id(id)
            .map(|el| self.id_for(&el))
    }

    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.collect(self.document.query_selector_all(&selector.to_css()))
    }

    fn query_within(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        match self.attached(scope) {
            Some(el) => self.collect(el.query_selector_all(&selector.to_css())),
            None => Vec::new(),
        }
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Ok(a), Ok(n)) => a.contains(Some(n.as_ref())),
            _ => false,
        }
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.attached(element).map(|el| el.tag_name().to_ascii_lowercase())
    }

    fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        self.attached(element)
            .is_some_and(|el| el.matches(&selector.to_css()).unwrap_or(false))
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_ok_and(|el| el.class_list().contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> DomResult<()> {
        self.element(element)?
            .class_list()
            .add_1(class)
            .map_err(|e| host_error("classList.add", &e))
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> DomResult<()> {
        self.element(element)?
            .class_list()
            .remove_1(class)
            .map_err(|e| host_error("classList.remove", &e))
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> DomResult<()> {
        self.element(element)?
            .set_attribute(name, value)
            .map_err(|e| host_error("setAttribute", &e))
    }

    fn text(&self, element: ElementId) -> Option<String> {
        self.element(element).ok()?.text_content()
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> DomResult<()> {
        self.element(element)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) -> DomResult<()> {
        self.html(element)?
            .style()
            .set_property(property, value)
            .map_err(|e| host_error("style.setProperty", &e))
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) -> DomResult<()> {
        let el = self.element(element)?;
        let result = if disabled {
            el.set_attribute("disabled", "")
        } else {
            el.remove_attribute("disabled")
        };
        result.map_err(|e| host_error("disabled", &e))
    }

    fn create_element(&mut self, tag: &str) -> DomResult<ElementId> {
        let el = self
            .document
            .create_element(tag)
            .map_err(|e| host_error("createElement", &e))?;
        Ok(self.id_for(&el))
    }

    fn append_to_body(&mut self, element: ElementId) -> DomResult<()> {
        let el = self.element(element)?;
        self.element(self.body)?
            .append_child(&el)
            .map(|_| ())
            .map_err(|e| host_error("appendChild", &e))
    }

    fn remove(&mut self, element: ElementId) -> DomResult<()> {
        let el = self.attached(element).ok_or(DomError::Detached(element))?;
        el.remove();
        Ok(())
    }

    fn reset_form(&mut self, form: ElementId) -> DomResult<()> {
        self.element(form)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| DomError::Host(format!("{form} is not a form")))?
            .reset();
        Ok(())
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let rect = self.attached(element)?.get_bounding_client_rect();
        Some(Rect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn viewport(&self) -> Viewport {
        let number = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let width = number(self.window.inner_width());
        let height = number(self.window.inner_height());
        let mut viewport = Viewport::new(width, height);
        viewport.scroll_y = self.window.scroll_y().unwrap_or(0.0);
        viewport.scroll_height = self
            .document
            .document_element()
            .map_or(height, |el| f64::from(el.scroll_height()));
        viewport
    }

    fn scroll_to_top(&mut self, smooth: bool) -> DomResult<()> {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        if smooth {
            options.set_behavior(ScrollBehavior::Smooth);
        }
        self.window.scroll_to_with_scroll_to_options(&options);
        Ok(())
    }
}

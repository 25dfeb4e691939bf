#![forbid(unsafe_code)]

//! `wasm-bindgen` export and browser wiring.
//!
//! [`PageRunner`] owns a [`RunnerCore`] over the live DOM and wires it to the
//! browser: DOM event listeners, two `IntersectionObserver`s (reveal and
//! lazy images), a `setTimeout` aimed at the next timer deadline, and
//! `requestAnimationFrame` while a counter is running. Page time comes from
//! `performance.now()`.
//!
//! # Usage
//!
//! ```js
//! import init, { PageRunner } from './pagefx_web.js';
//! await init();
//! const runner = new PageRunner(null);
//! runner.init();
//! // later: runner.destroy();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::rc::Rc;

use js_sys::Array;
use pagefx_core::{ElementId, IntersectionEntry, KeyPress, PageEvent};
use pagefx_runtime::{BootReport, Severity};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, EventTarget, HtmlFormElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, Window,
};

use crate::runner_core::{RunnerCore, StepResult};
use crate::web_document::WebDocument;
use crate::web_storage::LocalStore;

type Core = RunnerCore<WebDocument, LocalStore>;

const WINDOW_EVENTS: [&str; 3] = ["scroll", "resize", "load"];
const DOCUMENT_EVENTS: [&str; 5] = ["click", "keydown", "submit", "focusin", "focusout"];

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State reachable from every browser callback. Callbacks hold a `Weak`.
struct Shared {
    core: RefCell<Core>,
    window: Window,
    timeout: Cell<Option<i32>>,
    frame_pending: Cell<bool>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Shared {
    fn sync_time(&self) {
        if let Some(performance) = self.window.performance() {
            self.core.borrow_mut().set_time_ms(performance.now());
        }
    }

    /// Run due work, then re-arm the timeout and frame request.
    fn pump(&self) -> StepResult {
        let result = self.core.borrow_mut().step();

        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let (Some(delay), Some(tick)) = (result.next_timer_ms, self.tick.borrow().as_ref()) {
            match self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    tick.as_ref().unchecked_ref(),
                    delay.ceil().min(f64::from(i32::MAX)) as i32,
                ) {
                Ok(handle) => self.timeout.set(Some(handle)),
                Err(err) => tracing::error!(message = "pump.timeout_failed", error = ?err),
            }
        }

        if result.wants_frame && !self.frame_pending.get() {
            if let Some(frame) = self.frame.borrow().as_ref() {
                match self
                    .window
                    .request_animation_frame(frame.as_ref().unchecked_ref())
                {
                    Ok(_) => self.frame_pending.set(true),
                    Err(err) => tracing::error!(message = "pump.frame_failed", error = ?err),
                }
            }
        }
        result
    }

    fn on_dom_event(&self, kind: &'static str, event: &Event) {
        self.sync_time();
        let outcome = {
            let mut core = self.core.borrow_mut();
            let Some(page_event) = translate(kind, event, core.runtime().document()) else {
                return;
            };
            core.dispatch(&page_event)
        };
        if outcome.prevent_default {
            event.prevent_default();
        }
        self.pump();
    }

    fn on_intersections(&self, entries: &Array, observer: &IntersectionObserver, images: bool) {
        self.sync_time();
        let released: Vec<Element> = {
            let mut core = self.core.borrow_mut();
            let batch: Vec<IntersectionEntry> = {
                let doc = core.runtime().document();
                entries
                    .iter()
                    .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        element: doc.id_for(&entry.target()),
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect()
            };
            let released = if images {
                core.push_image_intersections(&batch)
            } else {
                core.push_intersections(&batch)
            };
            let doc = core.runtime().document();
            released
                .into_iter()
                .filter_map(|id| doc.element(id).ok())
                .collect()
        };
        for element in &released {
            observer.unobserve(element);
        }
        self.pump();
    }
}

/// Convert a DOM event into a page event. Events the page does not handle
/// map to `None`.
fn translate(kind: &str, event: &Event, doc: &WebDocument) -> Option<PageEvent> {
    let target = || {
        event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| doc.id_for(&el))
    };
    let page_event = match kind {
        "scroll" => PageEvent::Scroll,
        "resize" => PageEvent::Resize,
        "load" => PageEvent::Load,
        "click" => PageEvent::Click { target: target()? },
        "focusin" => PageEvent::Focus { target: target()? },
        "focusout" => PageEvent::Blur { target: target()? },
        "keydown" => {
            let key = event.dyn_ref::<KeyboardEvent>()?;
            PageEvent::Key(KeyPress {
                key: key.key(),
                ctrl: key.ctrl_key(),
                meta: key.meta_key(),
            })
        }
        "submit" => {
            let form = event.target()?.dyn_into::<HtmlFormElement>().ok()?;
            PageEvent::Submit {
                form: doc.id_for(&form),
                fields: doc.form_fields(&form),
            }
        }
        _ => return None,
    };
    Some(page_event)
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Everything installed in the browser, removed again on drop.
struct Wiring {
    listeners: Vec<Listener>,
    observers: Vec<(IntersectionObserver, ObserverCallback)>,
}

impl Wiring {
    fn install(shared: &Rc<Shared>, report: &BootReport) -> Result<Self, JsValue> {
        let document: EventTarget = shared
            .window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?
            .into();
        let window: EventTarget = shared.window.clone().into();

        let mut listeners = Vec::with_capacity(WINDOW_EVENTS.len() + DOCUMENT_EVENTS.len());
        for kind in WINDOW_EVENTS {
            listeners.push(listen(shared, &window, kind)?);
        }
        for kind in DOCUMENT_EVENTS {
            listeners.push(listen(shared, &document, kind)?);
        }

        let (reveal_init, reveal_targets, image_targets) = {
            let core = shared.core.borrow();
            let config = &core.runtime().config().reveal;
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(config.threshold));
            init.set_root_margin(&config.root_margin.to_css());
            let doc = core.runtime().document();
            (
                init,
                elements(doc, &report.reveal),
                elements(doc, &report.lazy_images),
            )
        };

        let mut observers = Vec::with_capacity(2);
        let reveal = observe(shared, &reveal_init, false)?;
        for element in &reveal_targets {
            reveal.0.observe(element);
        }
        observers.push(reveal);

        if !image_targets.is_empty() {
            let images = observe(shared, &IntersectionObserverInit::new(), true)?;
            for element in &image_targets {
                images.0.observe(element);
            }
            observers.push(images);
        }

        tracing::debug!(
            message = "runner.wired",
            listeners = listeners.len(),
            reveal = reveal_targets.len(),
            images = image_targets.len()
        );
        Ok(Self {
            listeners,
            observers,
        })
    }
}

impl Drop for Wiring {
    fn drop(&mut self) {
        for listener in &self.listeners {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        for (observer, _) in &self.observers {
            observer.disconnect();
        }
    }
}

fn elements(doc: &WebDocument, ids: &[ElementId]) -> Vec<Element> {
    ids.iter().filter_map(|&id| doc.element(id).ok()).collect()
}

fn listen(shared: &Rc<Shared>, target: &EventTarget, kind: &'static str) -> Result<Listener, JsValue> {
    let weak = Rc::downgrade(shared);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(shared) = weak.upgrade() {
            shared.on_dom_event(kind, &event);
        }
    });
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        kind,
        callback,
    })
}

fn observe(
    shared: &Rc<Shared>,
    init: &IntersectionObserverInit,
    images: bool,
) -> Result<(IntersectionObserver, ObserverCallback), JsValue> {
    let weak = Rc::downgrade(shared);
    let callback: ObserverCallback = Closure::new(move |entries: Array, observer: IntersectionObserver| {
        if let Some(shared) = weak.upgrade() {
            shared.on_intersections(&entries, &observer, images);
        }
    });
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), init)?;
    Ok((observer, callback))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[wasm_bindgen]
pub struct PageRunner {
    shared: Rc<Shared>,
    wiring: Option<Wiring>,
}

#[wasm_bindgen]
impl PageRunner {
    /// Bind to the current document. `config_json` is an optional partial
    /// page configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PageRunner, JsValue> {
        crate::console::install(tracing::Level::INFO);
        let doc = WebDocument::from_window().map_err(to_js)?;
        let window = doc.window().clone();
        let locale = window.navigator().language();
        let core = RunnerCore::from_config_json(
            doc,
            LocalStore::from_window(),
            config_json.as_deref(),
            locale,
        )
        .map_err(to_js)?;
        let shared = Rc::new(Shared {
            core: RefCell::new(core),
            window,
            timeout: Cell::new(None),
            frame_pending: Cell::new(false),
            tick: RefCell::new(None),
            frame: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        *shared.tick.borrow_mut() = Some(Closure::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.timeout.set(None);
                shared.sync_time();
                shared.pump();
            }
        }));
        let weak = Rc::downgrade(&shared);
        *shared.frame.borrow_mut() = Some(Closure::new(move |ts: f64| {
            if let Some(shared) = weak.upgrade() {
                shared.frame_pending.set(false);
                shared.core.borrow_mut().frame(ts);
                shared.pump();
            }
        }));

        Ok(Self {
            shared,
            wiring: None,
        })
    }

    /// Boot the page and start listening. A second call does nothing.
    pub fn init(&mut self) -> Result<(), JsValue> {
        if self.wiring.is_some() {
            return Ok(());
        }
        self.shared.sync_time();
        let report = self.shared.core.borrow_mut().init();
        self.wiring = Some(Wiring::install(&self.shared, &report)?);

        // The load event may already have fired.
        let complete = self
            .shared
            .window
            .document()
            .is_some_and(|d| d.ready_state() == "complete");
        if complete {
            self.shared.core.borrow_mut().dispatch(&PageEvent::Load);
        }
        self.shared.pump();
        Ok(())
    }

    /// Queue a JSON-encoded page event for the next pump.
    #[wasm_bindgen(js_name = pushEncodedEvent)]
    pub fn push_encoded_event(&self, json: &str) -> bool {
        self.shared.core.borrow_mut().push_encoded_event(json)
    }

    /// Pump now. Returns the step summary as JSON.
    pub fn step(&self) -> String {
        self.shared.sync_time();
        let result = self.shared.pump();
        serde_json::to_string(&result).unwrap_or_default()
    }

    /// Show a notification; `severity` is `info`, `success` or `error`.
    pub fn notify(&self, message: &str, severity: &str) -> bool {
        self.shared.sync_time();
        let shown = {
            let mut core = self.shared.core.borrow_mut();
            let now = core.now();
            core.runtime_mut()
                .notify(message, Severity::parse_lossy(severity), now)
                .is_some()
        };
        self.shared.pump();
        shown
    }

    /// Current theme name, once booted.
    pub fn theme(&self) -> Option<String> {
        self.shared
            .core
            .borrow()
            .runtime()
            .theme()
            .map(|t| t.as_str().to_string())
    }

    /// Handler failures so far.
    pub fn faults(&self) -> u32 {
        self.shared.core.borrow().runtime().faults() as u32
    }

    /// Remove listeners and observers and stop every timer.
    pub fn destroy(&mut self) {
        self.wiring = None;
        if let Some(handle) = self.shared.timeout.take() {
            self.shared.window.clear_timeout_with_handle(handle);
        }
        self.shared.core.borrow_mut().teardown();
    }
}

impl Drop for PageRunner {
    fn drop(&mut self) {
        self.destroy();
    }
}

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pagefx_core::memory::MemoryDocument;
use pagefx_core::storage::MemoryStore;
use pagefx_core::{ElementId, FormFields, IntersectionEntry, KeyPress, PageEvent, Rect};
use pagefx_runtime::{PageRuntime, Severity};

const KEYS: [&str; 5] = ["Escape", "k", "K", "Enter", "a"];

#[derive(Arbitrary, Debug)]
enum Op {
    Click(u8),
    Key { key: u8, ctrl: bool, meta: bool },
    Scroll(u16),
    Resize { width: u16, height: u16 },
    Submit(Vec<(String, String)>),
    Focus(u8),
    Blur(u8),
    Load,
    Intersect { element: u8, ratio: u8, hit: bool },
    Notify { message: String, severity: u8 },
    Advance(u16),
    Frame(u8),
    Observe,
}

struct Fixture {
    runtime: PageRuntime<MemoryDocument, MemoryStore>,
    elements: Vec<ElementId>,
    form: ElementId,
}

fn fixture() -> Fixture {
    let mut doc = MemoryDocument::default();
    doc.set_scroll_height(3000.0);
    let toggle = doc.element("button").id("theme-toggle").append();
    let icon = doc.element("span").id("theme-icon").child_of(toggle).append();
    let menu_button = doc.element("button").id("mobile-menu-button").append();
    let menu = doc.element("div").id("mobile-menu").class("hidden").append();
    let link = doc.element("a").attr("href", "#about").child_of(menu).append();
    let form = doc.element("form").append();
    let input = doc.element("input").attr("name", "email").child_of(form).append();
    let submit = doc
        .element("button")
        .attr("type", "submit")
        .text("Send Message")
        .child_of(form)
        .append();
    let section = doc
        .element("section")
        .class("fade-in-up")
        .rect(Rect::new(0.0, 1200.0, 800.0, 400.0))
        .append();
    let card = doc.element("div").class("fade-in-up").child_of(section).append();
    let stat = doc
        .element("div")
        .class("fade-in-up number-animate")
        .attr("data-target", "1500")
        .rect(Rect::new(0.0, 300.0, 100.0, 50.0))
        .append();
    let image = doc
        .element("img")
        .class("lazy")
        .attr("data-src", "/a.png")
        .rect(Rect::new(0.0, 2000.0, 100.0, 100.0))
        .append();

    Fixture {
        runtime: PageRuntime::new(doc, MemoryStore::new()),
        elements: vec![
            toggle, icon, menu_button, menu, link, form, input, submit, section, card, stat, image,
        ],
        form,
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut page = fixture();
    let pick = |i: u8| page.elements[usize::from(i) % page.elements.len()];
    let mut now = Duration::ZERO;
    page.runtime.boot(now);

    for op in ops.into_iter().take(256) {
        match op {
            Op::Click(i) => {
                let target = pick(i);
                page.runtime.handle_event(&PageEvent::Click { target }, now);
            }
            Op::Key { key, ctrl, meta } => {
                let key = KEYS[usize::from(key) % KEYS.len()].to_string();
                page.runtime
                    .handle_event(&PageEvent::Key(KeyPress { key, ctrl, meta }), now);
            }
            Op::Scroll(y) => {
                page.runtime.document_mut().set_scroll_y(f64::from(y));
                page.runtime.handle_event(&PageEvent::Scroll, now);
            }
            Op::Resize { width, height } => {
                page.runtime
                    .document_mut()
                    .resize(f64::from(width), f64::from(height));
                page.runtime.handle_event(&PageEvent::Resize, now);
            }
            Op::Submit(pairs) => {
                let fields: FormFields = pairs.into_iter().collect();
                let form = page.form;
                page.runtime
                    .handle_event(&PageEvent::Submit { form, fields }, now);
            }
            Op::Focus(i) => {
                let target = pick(i);
                page.runtime.handle_event(&PageEvent::Focus { target }, now);
            }
            Op::Blur(i) => {
                let target = pick(i);
                page.runtime.handle_event(&PageEvent::Blur { target }, now);
            }
            Op::Load => {
                page.runtime.handle_event(&PageEvent::Load, now);
            }
            Op::Intersect {
                element,
                ratio,
                hit,
            } => {
                let entry = IntersectionEntry {
                    element: pick(element),
                    ratio: f64::from(ratio) / 255.0,
                    is_intersecting: hit,
                };
                page.runtime.handle_intersections(&[entry], now);
                page.runtime.handle_image_intersections(&[entry], now);
            }
            Op::Notify { message, severity } => {
                let severity = match severity % 3 {
                    0 => Severity::Info,
                    1 => Severity::Success,
                    _ => Severity::Error,
                };
                page.runtime.notify(&message, severity, now);
            }
            Op::Advance(delta) => {
                now += Duration::from_millis(u64::from(delta));
                page.runtime.advance(now);
            }
            Op::Frame(delta) => {
                now += Duration::from_millis(u64::from(delta));
                page.runtime.animation_frame(now);
            }
            Op::Observe => {
                page.runtime.observe(now);
            }
        }
    }

    page.runtime.teardown();
    assert_eq!(page.runtime.next_deadline(), None);
    assert!(!page.runtime.wants_frame());
});

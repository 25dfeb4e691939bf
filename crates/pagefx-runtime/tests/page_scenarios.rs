//! End-to-end page scenarios driven through [`PageRuntime`] with an
//! in-memory document and store.

use std::time::Duration;

use pagefx_core::memory::MemoryDocument;
use pagefx_core::storage::MemoryStore;
use pagefx_core::{Document, ElementId, EventOutcome, FormFields, KeyPress, PageEvent, Rect};
use pagefx_runtime::menu::MenuState;
use pagefx_runtime::{NotificationPhase, PageRuntime, Severity, Theme};
use pretty_assertions::assert_eq;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

struct Page {
    runtime: PageRuntime<MemoryDocument, MemoryStore>,
    toggle_icon: ElementId,
    menu_button_svg: ElementId,
    menu: ElementId,
    form: ElementId,
    submit: ElementId,
    outside: ElementId,
}

fn landing_page(store: MemoryStore) -> Page {
    let mut doc = MemoryDocument::default();
    doc.set_scroll_height(2400.0);

    let toggle = doc.element("button").id("theme-toggle").append();
    let toggle_icon = doc.element("span").id("theme-icon").child_of(toggle).append();

    let menu_button = doc.element("button").id("mobile-menu-button").append();
    let menu_button_svg = doc.element("svg").child_of(menu_button).append();
    let menu = doc.element("div").id("mobile-menu").class("hidden").append();
    doc.element("a").attr("href", "#about").child_of(menu).append();

    let form = doc.element("form").append();
    doc.element("input").attr("name", "email").child_of(form).append();
    let submit = doc
        .element("button")
        .attr("type", "submit")
        .text("Send Message")
        .child_of(form)
        .append();

    let outside = doc
        .element("p")
        .text("Lorem ipsum")
        .rect(Rect::new(0.0, 1500.0, 600.0, 40.0))
        .append();

    Page {
        runtime: PageRuntime::new(doc, store),
        toggle_icon,
        menu_button_svg,
        menu,
        form,
        submit,
        outside,
    }
}

fn fields(first: &str, last: &str, email: &str, message: &str) -> FormFields {
    [
        ("firstName", first),
        ("lastName", last),
        ("email", email),
        ("message", message),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Page {
    fn click(&mut self, target: ElementId, now: Duration) -> EventOutcome {
        self.runtime.handle_event(&PageEvent::Click { target }, now)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[test]
fn overlapping_notifications_keep_their_own_timelines() {
    let mut page = landing_page(MemoryStore::new());
    let rt = &mut page.runtime;

    let a = rt.notify("A", Severity::Error, ms(0)).expect("A");
    let b = rt.notify("B", Severity::Success, ms(1_000)).expect("B");
    let a_el = rt.notifications().get(a).expect("A live").element;
    let b_el = rt.notifications().get(b).expect("B live").element;
    assert_ne!(a_el, b_el);
    assert_eq!(rt.document().text(a_el).as_deref(), Some("A"));
    assert!(rt.document().has_class(a_el, "bg-red-500"));
    assert!(rt.document().has_class(b_el, "bg-green-500"));

    rt.advance(ms(100));
    assert_eq!(rt.notifications().phase(a), Some(NotificationPhase::Visible));
    assert_eq!(rt.notifications().phase(b), Some(NotificationPhase::Entering));
    assert!(!rt.document().has_class(a_el, "translate-x-full"));
    assert!(rt.document().has_class(b_el, "translate-x-full"));

    rt.advance(ms(1_100));
    assert_eq!(rt.notifications().phase(b), Some(NotificationPhase::Visible));

    rt.advance(ms(4_999));
    assert_eq!(rt.notifications().phase(a), Some(NotificationPhase::Visible));
    rt.advance(ms(5_000));
    assert_eq!(rt.notifications().phase(a), Some(NotificationPhase::Leaving));
    assert!(rt.document().has_class(a_el, "translate-x-full"));

    rt.advance(ms(5_300));
    assert_eq!(rt.notifications().phase(a), Some(NotificationPhase::Removed));
    assert!(!rt.document().is_attached(a_el));
    assert_eq!(rt.notifications().phase(b), Some(NotificationPhase::Visible));
    assert!(rt.document().is_attached(b_el));

    rt.advance(ms(6_000));
    assert_eq!(rt.notifications().phase(b), Some(NotificationPhase::Leaving));
    rt.advance(ms(6_300));
    assert_eq!(rt.notifications().phase(b), Some(NotificationPhase::Removed));
    assert!(!rt.document().is_attached(b_el));
    assert!(rt.notifications().active().is_empty());
    assert_eq!(rt.faults(), 0);
}

#[test]
fn late_pump_still_runs_every_transition() {
    let mut page = landing_page(MemoryStore::new());
    let rt = &mut page.runtime;
    let id = rt.notify("hello", Severity::Info, ms(0)).expect("notify");
    // One pump far past the end runs slide-in, slide-out and removal.
    assert_eq!(rt.advance(ms(60_000)), 3);
    assert_eq!(rt.notifications().phase(id), Some(NotificationPhase::Removed));
}

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

#[test]
fn missing_first_name_is_rejected() {
    let mut page = landing_page(MemoryStore::new());
    let event = PageEvent::Submit {
        form: page.form,
        fields: fields("", "Doe", "x@y.com", "hi"),
    };
    let outcome = page.runtime.handle_event(&event, ms(0));
    assert_eq!(outcome, EventOutcome::PREVENT_DEFAULT);

    let rt = &page.runtime;
    let active = rt.notifications().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Error);
    assert!(active[0].message.contains("First name is required"));
    assert!(!rt.form().expect("form").is_sending());
    assert_eq!(rt.document().text(page.submit).as_deref(), Some("Send Message"));
    assert!(!rt.document().is_disabled(page.submit));
}

#[test]
fn invalid_email_is_rejected() {
    let mut page = landing_page(MemoryStore::new());
    let event = PageEvent::Submit {
        form: page.form,
        fields: fields("A", "B", "not-an-email", "hi"),
    };
    page.runtime.handle_event(&event, ms(0));

    let active = page.runtime.notifications().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Error);
    assert!(active[0].message.contains("Please enter a valid email address"));
    assert!(!page.runtime.form().expect("form").is_sending());
}

#[test]
fn valid_submission_sends_then_resets() {
    let mut page = landing_page(MemoryStore::new());
    let event = PageEvent::Submit {
        form: page.form,
        fields: fields("Ada", "Lovelace", "ada@example.com", "Hello there"),
    };
    assert_eq!(
        page.runtime.handle_event(&event, ms(0)),
        EventOutcome::PREVENT_DEFAULT
    );
    assert!(page.runtime.notifications().active().is_empty());
    {
        let doc = page.runtime.document();
        assert_eq!(doc.text(page.submit).as_deref(), Some("Sending..."));
        assert!(doc.is_disabled(page.submit));
    }

    // A second submit while sending is swallowed.
    page.runtime.handle_event(&event, ms(500));
    assert!(page.runtime.notifications().active().is_empty());

    page.runtime.advance(ms(1_999));
    assert!(page.runtime.form().expect("form").is_sending());
    page.runtime.advance(ms(2_000));

    let rt = &page.runtime;
    assert!(!rt.form().expect("form").is_sending());
    assert_eq!(rt.document().form_resets(), &[page.form]);
    assert_eq!(rt.document().text(page.submit).as_deref(), Some("Send Message"));
    assert!(!rt.document().is_disabled(page.submit));
    let active = rt.notifications().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Success);
    assert_eq!(
        active[0].message,
        "Thank you! Your message has been sent successfully."
    );
}

#[test]
fn submit_from_another_form_is_ignored() {
    let mut page = landing_page(MemoryStore::new());
    let newsletter = page.runtime.document_mut().element("form").append();
    let event = PageEvent::Submit {
        form: newsletter,
        fields: fields("", "", "", ""),
    };
    assert_eq!(page.runtime.handle_event(&event, ms(0)), EventOutcome::NONE);
    assert!(page.runtime.notifications().active().is_empty());
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[test]
fn theme_round_trip_from_empty_store() {
    let mut page = landing_page(MemoryStore::new());
    assert_eq!(page.runtime.theme(), None);
    page.runtime.boot(ms(0));
    assert_eq!(page.runtime.theme(), Some(Theme::Dark));
    let root = page.runtime.document().root();
    assert!(!page.runtime.document().has_class(root, "light"));
    assert_eq!(
        page.runtime.document().text(page.toggle_icon).as_deref(),
        Some("\u{1F319}")
    );

    // Clicking the icon inside the toggle counts as a toggle click.
    page.click(page.toggle_icon, ms(1_000));
    let rt = &page.runtime;
    assert_eq!(rt.theme(), Some(Theme::Light));
    assert_eq!(rt.store().peek("theme"), Some("light"));
    assert!(rt.document().has_class(root, "light"));
    assert!(rt.document().has_class(root, "theme-transitioning"));
    assert_eq!(rt.document().text(page.toggle_icon).as_deref(), Some("\u{1F31E}"));

    page.runtime.advance(ms(1_300));
    assert!(!page.runtime.document().has_class(root, "theme-transitioning"));

    page.click(page.toggle_icon, ms(2_000));
    assert_eq!(page.runtime.theme(), Some(Theme::Dark));
    assert_eq!(page.runtime.store().peek("theme"), Some("dark"));
    assert!(!page.runtime.document().has_class(root, "light"));
    assert_eq!(page.runtime.store().writes(), 2);
}

#[test]
fn stored_light_preference_applies_at_boot() {
    let mut page = landing_page(MemoryStore::with_entry("theme", "light"));
    page.runtime.boot(ms(0));
    assert_eq!(page.runtime.theme(), Some(Theme::Light));
    let root = page.runtime.document().root();
    assert!(page.runtime.document().has_class(root, "light"));
}

#[test]
fn unwritable_store_still_toggles() {
    let mut page = landing_page(MemoryStore::read_only());
    page.runtime.boot(ms(0));
    page.click(page.toggle_icon, ms(10));
    assert_eq!(page.runtime.theme(), Some(Theme::Light));
    assert_eq!(page.runtime.store().peek("theme"), None);
}

// ---------------------------------------------------------------------------
// Menu and keyboard
// ---------------------------------------------------------------------------

#[test]
fn menu_opens_and_dismisses_on_outside_click() {
    let mut page = landing_page(MemoryStore::new());
    page.click(page.menu_button_svg, ms(0));
    {
        let rt = &page.runtime;
        assert_eq!(rt.menu().expect("menu").state(), MenuState::Open);
        assert!(!rt.document().has_class(page.menu, "hidden"));
        assert!(rt.document().has_class(page.menu_button_svg, "rotate-90"));
    }

    page.click(page.outside, ms(100));
    let rt = &page.runtime;
    assert_eq!(rt.menu().expect("menu").state(), MenuState::Closed);
    assert!(rt.document().has_class(page.menu, "hidden"));
    assert!(!rt.document().has_class(page.menu_button_svg, "rotate-90"));
}

#[test]
fn menu_button_closes_with_transition() {
    let mut page = landing_page(MemoryStore::new());
    page.click(page.menu_button_svg, ms(0));
    page.click(page.menu_button_svg, ms(1_000));
    assert!(matches!(
        page.runtime.menu().expect("menu").state(),
        MenuState::Closing { .. }
    ));
    assert!(!page.runtime.document().has_class(page.menu, "hidden"));

    page.runtime.advance(ms(1_300));
    assert_eq!(page.runtime.menu().expect("menu").state(), MenuState::Closed);
    assert!(page.runtime.document().has_class(page.menu, "hidden"));
}

#[test]
fn escape_closes_menu_and_search_shortcut_notifies() {
    let mut page = landing_page(MemoryStore::new());
    page.click(page.menu_button_svg, ms(0));
    let escape = PageEvent::Key(KeyPress::new("Escape"));
    assert_eq!(page.runtime.handle_event(&escape, ms(10)), EventOutcome::NONE);
    assert!(!page.runtime.menu().expect("menu").is_open());

    let search = PageEvent::Key(KeyPress::new("k").with_meta());
    assert_eq!(
        page.runtime.handle_event(&search, ms(20)),
        EventOutcome::PREVENT_DEFAULT
    );
    let active = page.runtime.notifications().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Info);
    assert_eq!(active[0].message, "Search feature coming soon!");
}

// ---------------------------------------------------------------------------
// Reveal and counters
// ---------------------------------------------------------------------------

#[test]
fn cascade_reveals_children_and_runs_counter() {
    let mut doc = MemoryDocument::default();
    let stats = doc
        .element("section")
        .class("fade-in-up")
        .rect(Rect::new(0.0, 200.0, 800.0, 300.0))
        .append();
    let heading = doc.element("h2").class("fade-in-up").child_of(stats).append();
    let counter = doc
        .element("span")
        .class("fade-in-up number-animate")
        .attr("data-target", "12500")
        .text("0")
        .child_of(stats)
        .append();

    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    let report = rt.boot(ms(0));
    assert_eq!(report.reveal, vec![stats]);

    assert_eq!(rt.observe(ms(50)), vec![stats]);
    assert!(rt.document().has_class(stats, "is-visible"));
    assert!(!rt.document().has_class(heading, "is-visible"));

    rt.advance(ms(50));
    assert!(rt.document().has_class(heading, "is-visible"));
    assert!(!rt.document().has_class(counter, "is-visible"));
    assert!(!rt.wants_frame());

    rt.advance(ms(150));
    assert!(rt.document().has_class(counter, "is-visible"));
    assert!(rt.wants_frame());

    let mut now = ms(160);
    while rt.wants_frame() {
        rt.animation_frame(now);
        now += ms(250);
    }
    assert_eq!(rt.document().text(counter).as_deref(), Some("12,500"));
    assert_eq!(rt.counters().displayed(counter), Some(12_500));

    // Scrolling back never re-activates.
    rt.document_mut().set_scroll_y(1000.0);
    assert!(rt.observe(now).is_empty());
    rt.document_mut().set_scroll_y(0.0);
    assert!(rt.observe(now + ms(16)).is_empty());
    assert_eq!(rt.faults(), 0);
}

#[test]
fn bad_counter_target_is_isolated() {
    let mut doc = MemoryDocument::default();
    let broken = doc
        .element("div")
        .class("fade-in-up number-animate")
        .attr("data-target", "lots")
        .rect(Rect::new(0.0, 100.0, 200.0, 100.0))
        .append();
    let fine = doc
        .element("div")
        .class("fade-in-up")
        .rect(Rect::new(0.0, 300.0, 200.0, 100.0))
        .append();

    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    rt.boot(ms(0));
    assert_eq!(rt.observe(ms(16)), vec![broken, fine]);
    assert!(rt.document().has_class(broken, "is-visible"));
    assert!(rt.document().has_class(fine, "is-visible"));
    assert_eq!(rt.faults(), 1);
    assert!(!rt.wants_frame());
}

#[test]
fn below_the_fold_waits_for_scroll() {
    let mut doc = MemoryDocument::default();
    doc.set_scroll_height(3000.0);
    let card = doc
        .element("div")
        .class("fade-in-up")
        .rect(Rect::new(0.0, 1200.0, 400.0, 200.0))
        .append();
    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    rt.boot(ms(0));
    assert!(rt.observe(ms(16)).is_empty());

    rt.document_mut().set_scroll_y(800.0);
    assert_eq!(rt.observe(ms(32)), vec![card]);
}

// ---------------------------------------------------------------------------
// Scroll, loading and teardown
// ---------------------------------------------------------------------------

#[test]
fn scroll_burst_updates_progress_once() {
    let mut doc = MemoryDocument::default();
    doc.set_scroll_height(1800.0);
    let bar = doc.element("div").class("scroll-progress").append();
    let back = doc
        .element("button")
        .id("back-to-top")
        .class("opacity-0 invisible translate-y-10")
        .append();
    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    rt.boot(ms(0));

    for (t, y) in [(0, 100.0), (4, 300.0), (8, 500.0)] {
        rt.document_mut().set_scroll_y(y);
        rt.handle_event(&PageEvent::Scroll, ms(t));
    }
    rt.advance(ms(17));
    assert_eq!(rt.document().style(bar, "width"), None);
    rt.advance(ms(18));
    assert_eq!(rt.document().style(bar, "width"), Some("50%"));
    assert!(rt.document().has_class(back, "opacity-100"));
    assert!(!rt.document().has_class(back, "invisible"));

    rt.handle_event(&PageEvent::Click { target: back }, ms(100));
    assert_eq!(rt.document().scroll_requests(), &[true]);
    assert_eq!(rt.document().viewport().scroll_y, 0.0);
}

#[test]
fn resize_recomputes_progress() {
    let mut doc = MemoryDocument::default();
    doc.set_scroll_height(1800.0);
    doc.set_scroll_y(500.0);
    let bar = doc.element("div").class("scroll-progress").append();
    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    rt.boot(ms(0));

    rt.handle_event(&PageEvent::Scroll, ms(0));
    rt.advance(ms(10));
    assert_eq!(rt.document().style(bar, "width"), Some("50%"));

    // A taller viewport leaves less to scroll, so the same offset is further along.
    rt.document_mut().resize(1280.0, 1300.0);
    rt.handle_event(&PageEvent::Resize, ms(100));
    rt.advance(ms(109));
    assert_eq!(rt.document().style(bar, "width"), Some("50%"));
    rt.advance(ms(110));
    assert_eq!(rt.document().style(bar, "width"), Some("100%"));
    assert_eq!(rt.faults(), 0);
}

#[test]
fn load_event_fades_the_loading_screen() {
    let mut doc = MemoryDocument::default();
    let screen = doc.element("div").id("loading-screen").append();
    let hero = doc.element("div").id("hero-image-container").append();
    let mut rt = PageRuntime::new(doc, MemoryStore::new());
    rt.boot(ms(0));

    rt.advance(ms(300));
    assert_eq!(rt.document().style(hero, "opacity"), Some("1"));

    rt.handle_event(&PageEvent::Load, ms(400));
    let body = rt.document().body();
    assert!(rt.document().has_class(body, "loaded"));
    rt.advance(ms(1_400));
    assert_eq!(rt.document().style(screen, "opacity"), Some("0"));
    assert_eq!(rt.document().style(screen, "display"), None);
    rt.advance(ms(1_900));
    assert_eq!(rt.document().style(screen, "display"), Some("none"));
}

#[test]
fn teardown_cancels_everything() {
    let mut page = landing_page(MemoryStore::new());
    page.runtime.boot(ms(0));
    let id = page
        .runtime
        .notify("bye", Severity::Info, ms(0))
        .expect("notify");
    let el = page.runtime.notifications().get(id).expect("live").element;
    page.runtime.handle_event(&PageEvent::Scroll, ms(0));
    assert!(page.runtime.pending_timers() > 0);

    page.runtime.teardown();
    let rt = &mut page.runtime;
    assert!(rt.is_torn_down());
    assert_eq!(rt.pending_timers(), 0);
    assert!(!rt.wants_frame());
    assert!(!rt.document().is_attached(el));
    assert!(rt.notifications().active().is_empty());

    assert_eq!(rt.advance(ms(10_000)), 0);
    assert_eq!(
        rt.handle_event(&PageEvent::Key(KeyPress::new("k").with_ctrl()), ms(10_000)),
        EventOutcome::NONE
    );
    assert_eq!(rt.notify("late", Severity::Info, ms(10_000)), None);
    assert_eq!(rt.boot(ms(10_000)).reveal.len(), 0);
}

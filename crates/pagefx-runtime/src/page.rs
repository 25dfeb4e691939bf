#![forbid(unsafe_code)]

//! The page runtime: every component wired to one document, one store and
//! one scheduler.
//!
//! # Host loop
//!
//! The host drives the runtime with page time:
//!
//! 1. [`PageRuntime::boot`] once the document is ready.
//! 2. [`PageRuntime::handle_event`] for every DOM event.
//! 3. [`PageRuntime::handle_intersections`] for observer batches, or
//!    [`PageRuntime::observe`] to sample geometry directly.
//! 4. [`PageRuntime::advance`] when a timer may be due.
//! 5. [`PageRuntime::animation_frame`] once per rendered frame while
//!    [`PageRuntime::wants_frame`] is true.
//! 6. [`PageRuntime::teardown`] when the page goes away.
//!
//! # Failure Modes
//!
//! Each handler and task runs in isolation: a failing one is logged, counted
//! in [`PageRuntime::faults`], and the rest of the event or batch still runs.

use std::time::Duration;

use pagefx_core::storage::KeyValueStore;
use pagefx_core::{
    BehaviorTags, Document, ElementId, EventOutcome, FormFields, IntersectionEntry, KeyPress,
    PageEvent, Selector,
};

use crate::config::PageConfig;
use crate::counter::CounterAnimator;
use crate::error::{PageError, Result};
use crate::focus::FocusRing;
use crate::form::{ContactForm, SubmitOutcome};
use crate::keyboard::{Shortcut, shortcut_for};
use crate::lazy_image::LazyImages;
use crate::loading::LoadingScreen;
use crate::menu::MobileMenu;
use crate::notification::{NotificationCenter, NotificationId, Severity};
use crate::reveal::RevealAnimator;
use crate::scheduler::{Due, Scheduler};
use crate::scroll::ScrollIndicators;
use crate::task::Task;
use crate::theme::{Theme, ThemeController};
use crate::typewriter::Typewriter;
use crate::visibility::{ActivationEvent, VisibilityWatcher, WatcherOptions};

/// Elements registered at boot, for hosts that wire real observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    /// Reveal elements, in document order.
    pub reveal: Vec<ElementId>,
    /// Deferred images, in document order.
    pub lazy_images: Vec<ElementId>,
}

pub struct PageRuntime<D, S> {
    config: PageConfig,
    doc: D,
    store: S,
    scheduler: Scheduler<Task>,
    watcher: VisibilityWatcher,
    reveal: RevealAnimator,
    counters: CounterAnimator,
    counter_class: String,
    notifications: NotificationCenter,
    theme: Option<ThemeController>,
    menu: Option<MobileMenu>,
    form: Option<ContactForm>,
    scroll: ScrollIndicators,
    loading: LoadingScreen,
    focus: FocusRing,
    lazy: LazyImages,
    typewriter: Typewriter,
    booted: bool,
    torn_down: bool,
    faults: usize,
}

impl<D, S> std::fmt::Debug for PageRuntime<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("booted", &self.booted)
            .field("torn_down", &self.torn_down)
            .field("scheduler", &self.scheduler)
            .field("pending_reveals", &self.watcher.pending_count())
            .field("notifications", &self.notifications.active().len())
            .field("faults", &self.faults)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Runtime with the default configuration.
    pub fn new(doc: D, store: S) -> Self {
        Self::with_config(doc, store, PageConfig::default())
    }

    /// Bind components to the document. Nothing is mutated until
    /// [`boot`](Self::boot).
    pub fn with_config(doc: D, store: S, config: PageConfig) -> Self {
        let watcher = VisibilityWatcher::new(WatcherOptions {
            threshold: config.reveal.threshold,
            root_margin: config.reveal.root_margin,
        });
        Self {
            watcher,
            reveal: RevealAnimator::new(&config.reveal),
            counters: CounterAnimator::new(&config.counter),
            counter_class: config.counter.counter_class.clone(),
            notifications: NotificationCenter::new(config.notification.clone()),
            theme: None,
            menu: MobileMenu::attach(config.menu.clone(), &doc),
            form: ContactForm::attach(config.form.clone(), &doc),
            scroll: ScrollIndicators::attach(config.scroll.clone(), &doc),
            loading: LoadingScreen::attach(config.loading.clone(), &doc),
            focus: FocusRing::new(&config.focus),
            lazy: LazyImages::new(config.lazy_images.clone()),
            typewriter: Typewriter::attach(&config.typewriter, &doc),
            scheduler: Scheduler::new(),
            booted: false,
            torn_down: false,
            faults: 0,
            config,
            doc,
            store,
        }
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl<D, S> PageRuntime<D, S> {
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Host-side access, e.g. to scroll or resize a memory document.
    #[inline]
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn watcher(&self) -> &VisibilityWatcher {
        &self.watcher
    }

    #[inline]
    #[must_use]
    pub fn reveal(&self) -> &RevealAnimator {
        &self.reveal
    }

    #[inline]
    #[must_use]
    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    #[inline]
    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[inline]
    #[must_use]
    pub fn menu(&self) -> Option<&MobileMenu> {
        self.menu.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn scroll(&self) -> &ScrollIndicators {
        &self.scroll
    }

    #[inline]
    #[must_use]
    pub fn lazy_images(&self) -> &LazyImages {
        &self.lazy
    }

    #[inline]
    #[must_use]
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// Current theme; `None` before boot.
    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.theme.as_ref().map(ThemeController::theme)
    }

    /// Handler and task failures so far.
    #[inline]
    #[must_use]
    pub fn faults(&self) -> usize {
        self.faults
    }

    #[inline]
    #[must_use]
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    #[inline]
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Earliest pending timer, for hosts that sleep until it.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_timers()
    }

    /// Whether a frame callback is waiting.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        self.scheduler.wants_frame()
    }

    /// Log a failed handler and keep going.
    fn isolate<T>(&mut self, handler: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.faults += 1;
                if err.is_recoverable() {
                    tracing::warn!(message = "page.fault", handler, error = %err);
                } else {
                    tracing::error!(message = "page.fault", handler, error = %err);
                }
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Register observed elements and run boot-time effects. A second call
    /// returns an empty report.
    pub fn boot(&mut self, now: Duration) -> BootReport {
        if self.booted || self.torn_down {
            return BootReport::default();
        }
        self.booted = true;

        let reveal = self.register_reveals();

        let theme = ThemeController::init(self.config.theme.clone(), &mut self.doc, &self.store);
        self.theme = self.isolate("theme.init", theme);

        self.loading.boot(&mut self.scheduler, now);

        let typed = self.typewriter.boot(&mut self.doc, &mut self.scheduler, now);
        self.isolate("typewriter.boot", typed);

        let lazy_images = self.lazy.register(&self.doc);

        tracing::debug!(
            message = "page.boot",
            reveal = reveal.len(),
            lazy_images = lazy_images.len(),
            menu = self.menu.is_some(),
            form = self.form.is_some()
        );
        BootReport {
            reveal,
            lazy_images,
        }
    }

    /// Register the outermost reveal elements with their behavior tags.
    fn register_reveals(&mut self) -> Vec<ElementId> {
        let selector = self.reveal.selector().clone();
        let counter = Selector::class(self.counter_class.clone());
        let mut registered: Vec<ElementId> = Vec::new();
        for element in self.doc.query_all(&selector) {
            // Nested reveal elements belong to their ancestor's cascade.
            if registered.iter().any(|&r| self.doc.contains(r, element)) {
                continue;
            }
            let mut tags = BehaviorTags::REVEAL;
            if self.doc.matches(element, &counter) {
                tags |= BehaviorTags::COUNTER;
            }
            if self.doc.query_first_within(element, &selector).is_some() {
                tags |= BehaviorTags::STAGGER_CHILDREN;
            }
            if self.watcher.observe(element, tags) {
                registered.push(element);
            }
        }
        registered
    }

    /// Stop all timers and frame callbacks and remove live notifications.
    /// Animations that were cut short are not resumed.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.scroll.cancel(&mut self.scheduler);
        self.scheduler.clear();
        self.watcher.clear();
        self.lazy.clear();
        let cleared = self.notifications.clear(&mut self.doc);
        self.isolate("notify.clear", cleared);
        tracing::debug!(message = "page.teardown", faults = self.faults);
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Dispatch one DOM event to every interested component.
    pub fn handle_event(&mut self, event: &PageEvent, now: Duration) -> EventOutcome {
        if self.torn_down {
            return EventOutcome::NONE;
        }
        tracing::trace!(message = "page.event", kind = event.kind());
        match event {
            PageEvent::Scroll => {
                self.scroll.on_scroll(&mut self.scheduler, now);
                EventOutcome::NONE
            }
            PageEvent::Resize => {
                self.scroll.on_resize(&mut self.scheduler, now);
                EventOutcome::NONE
            }
            PageEvent::Click { target } => {
                self.on_click(*target, now);
                EventOutcome::NONE
            }
            PageEvent::Key(key) => self.on_key(key, now),
            PageEvent::Submit { form, fields } => self.on_submit(*form, fields, now),
            PageEvent::Focus { target } => {
                let r = self.focus.on_focus(&mut self.doc, *target);
                self.isolate("focus.focus", r);
                EventOutcome::NONE
            }
            PageEvent::Blur { target } => {
                let r = self.focus.on_blur(&mut self.doc, *target);
                self.isolate("focus.blur", r);
                EventOutcome::NONE
            }
            PageEvent::Load => {
                let r = self.loading.on_load(&mut self.doc, &mut self.scheduler, now);
                self.isolate("loading.load", r);
                EventOutcome::NONE
            }
        }
    }

    fn on_click(&mut self, target: ElementId, now: Duration) {
        if let Some(theme) = self.theme.as_mut() {
            if theme.is_toggle(&self.doc, target) {
                let r = theme.toggle(&mut self.doc, &mut self.store, &mut self.scheduler, now);
                self.isolate("theme.toggle", r);
            }
        }
        if let Some(menu) = self.menu.as_mut() {
            let r = menu.on_click(&mut self.doc, &mut self.scheduler, now, target);
            self.isolate("menu.click", r);
        }
        if self.scroll.is_back_to_top(&self.doc, target) {
            let r = self.scroll.scroll_to_top(&mut self.doc);
            self.isolate("scroll.to_top", r);
        }
    }

    fn on_key(&mut self, key: &KeyPress, now: Duration) -> EventOutcome {
        match shortcut_for(key, &self.config.keyboard) {
            Some(Shortcut::CloseMenu) => {
                if let Some(menu) = self.menu.as_mut() {
                    let r = menu.close_now(&mut self.doc, &mut self.scheduler);
                    self.isolate("menu.escape", r);
                }
                EventOutcome::NONE
            }
            Some(shortcut @ Shortcut::Search) => {
                let message = self.config.keyboard.search_message.clone();
                self.notify(&message, Severity::Info, now);
                EventOutcome {
                    prevent_default: shortcut.prevents_default(),
                }
            }
            None => EventOutcome::NONE,
        }
    }

    fn on_submit(&mut self, form: ElementId, fields: &FormFields, now: Duration) -> EventOutcome {
        let Some(contact) = self.form.as_mut().filter(|c| c.form() == form) else {
            return EventOutcome::NONE;
        };
        let r = contact.on_submit(&mut self.doc, &mut self.scheduler, now, fields);
        if let Some(SubmitOutcome::Rejected(message)) = self.isolate("form.submit", r) {
            self.notify(&message, Severity::Error, now);
        }
        EventOutcome::PREVENT_DEFAULT
    }

    /// Show a notification. `None` if the banner could not be created.
    pub fn notify(
        &mut self,
        message: &str,
        severity: Severity,
        now: Duration,
    ) -> Option<NotificationId> {
        if self.torn_down {
            return None;
        }
        let r = self
            .notifications
            .notify(&mut self.doc, &mut self.scheduler, now, message, severity);
        self.isolate("notify.create", r)
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Process a batch of reveal-observer samples. Every activation in the
    /// batch is fully handled before any element is released. Returns the
    /// released elements so the host can unobserve them.
    pub fn handle_intersections(
        &mut self,
        entries: &[IntersectionEntry],
        now: Duration,
    ) -> Vec<ElementId> {
        if self.torn_down {
            return Vec::new();
        }
        let events = self.watcher.observe_batch(entries, now);
        self.process_activations(&events)
    }

    /// Process a batch of image-observer samples. Returns the released images.
    pub fn handle_image_intersections(
        &mut self,
        entries: &[IntersectionEntry],
        now: Duration,
    ) -> Vec<ElementId> {
        if self.torn_down {
            return Vec::new();
        }
        let r = self.lazy.observe_batch(&mut self.doc, entries, now);
        self.isolate("lazy.load", r).unwrap_or_default()
    }

    /// Sample geometry for both watchers, for hosts without observers.
    /// Returns every released element.
    pub fn observe(&mut self, now: Duration) -> Vec<ElementId> {
        if self.torn_down || !self.booted {
            return Vec::new();
        }
        let events = self.watcher.scan(&self.doc, now);
        let mut released = self.process_activations(&events);
        let r = self.lazy.scan(&mut self.doc, now);
        released.extend(self.isolate("lazy.load", r).unwrap_or_default());
        released
    }

    fn process_activations(&mut self, events: &[ActivationEvent]) -> Vec<ElementId> {
        for event in events {
            let r = self.reveal.activate(&mut self.doc, &mut self.scheduler, event);
            self.isolate("reveal.activate", r);
            if event.tags.contains(BehaviorTags::COUNTER) {
                self.start_counter(event.element);
            }
        }
        events
            .iter()
            .filter(|e| self.watcher.release(e.element))
            .map(|e| e.element)
            .collect()
    }

    fn start_counter(&mut self, element: ElementId) {
        let r = self.counters.start(&self.doc, &mut self.scheduler, element);
        self.isolate("counter.start", r);
    }
}

// ---------------------------------------------------------------------------
// Timers and frames
// ---------------------------------------------------------------------------

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Run every timer due at `now`, earliest first. Each task sees its own
    /// deadline as the current time. Returns the number of tasks run.
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut ran = 0;
        while let Some(due) = self.scheduler.pop_due(now) {
            self.run_timer(due);
            ran += 1;
        }
        ran
    }

    fn run_timer(&mut self, due: Due<Task>) {
        let at = due.deadline;
        let handler = due.task.kind();
        let result: Result<()> = match due.task {
            Task::RevealChild { parent, child } => {
                let r = self.reveal.reveal_child(&mut self.doc, parent, child);
                if r.is_ok() && self.doc.has_class(child, &self.counter_class) {
                    self.start_counter(child);
                }
                r
            }
            Task::Notification { id, step } => {
                self.notifications
                    .advance(&mut self.doc, &mut self.scheduler, at, id, step)
            }
            Task::ThemeTransitionEnd => match self.theme.as_mut() {
                Some(theme) => theme.on_transition_end(&mut self.doc),
                None => Ok(()),
            },
            Task::MenuCloseEnd => match self.menu.as_mut() {
                Some(menu) => menu.on_close_end(&mut self.doc),
                None => Ok(()),
            },
            Task::FormSubmitted => self.finish_submission(at),
            Task::ScrollProgress => self.scroll.update_progress(&mut self.doc, due.id),
            Task::BackToTop => self.scroll.update_back_to_top(&mut self.doc, due.id),
            Task::LoadingFade => self.loading.on_fade(&mut self.doc, &mut self.scheduler, at),
            Task::LoadingHide => self.loading.on_hide(&mut self.doc),
            Task::HeroIntro => self.loading.on_hero(&mut self.doc),
            Task::TypewriterTick(index) => {
                self.typewriter
                    .tick(&mut self.doc, &mut self.scheduler, at, index)
            }
            Task::CounterFrame(element) => Err(PageError::host(format!(
                "counter frame for {element} delivered as a timer"
            ))),
        };
        self.isolate(handler, result);
    }

    fn finish_submission(&mut self, now: Duration) -> Result<()> {
        if !self.form.as_ref().is_some_and(ContactForm::is_sending) {
            return Ok(());
        }
        let message = self.config.form.success_message.clone();
        self.notify(&message, Severity::Success, now);
        match self.form.as_mut() {
            Some(contact) => contact.on_submitted(&mut self.doc).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Run the callbacks requested before this frame. Callbacks requested
    /// while it runs wait for the next frame. Returns the number run.
    pub fn animation_frame(&mut self, now: Duration) -> usize {
        if self.torn_down {
            return 0;
        }
        let tasks = self.scheduler.take_frame_tasks();
        let ran = tasks.len();
        for task in tasks {
            let r = match task {
                Task::CounterFrame(element) => {
                    self.counters
                        .on_frame(&mut self.doc, &mut self.scheduler, element, now)
                }
                other => Err(PageError::host(format!(
                    "{} delivered as a frame callback",
                    other.kind()
                ))),
            };
            self.isolate("counter.frame", r);
        }
        ran
    }
}

#![forbid(unsafe_code)]

//! Contact form validation and simulated submission.

use std::sync::LazyLock;
use std::time::Duration;

use pagefx_core::{Document, ElementId, FormFields, Selector};
use regex::Regex;

use crate::config::FormConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::task::Task;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const REQUIRED: [(&str, &str); 4] = [
    ("firstName", "First name is required"),
    ("lastName", "Last name is required"),
    ("email", "Email is required"),
    ("message", "Message is required"),
];

/// Whether `email` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Validate submitted fields. Returns every problem, in a fixed order.
#[must_use]
pub fn validate(fields: &FormFields) -> Vec<String> {
    let mut errors: Vec<String> = REQUIRED
        .iter()
        .filter(|(name, _)| fields.get(*name).is_none_or(|v| v.trim().is_empty()))
        .map(|(_, msg)| (*msg).to_string())
        .collect();
    if let Some(email) = fields.get("email").filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            errors.push("Please enter a valid email address".to_string());
        }
    }
    errors
}

/// Result of a submit event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the joined message to show.
    Rejected(String),
    /// Submission started.
    Sending,
    /// A submission is already in flight.
    Busy,
}

#[derive(Debug, Clone)]
struct InFlight {
    button: Option<ElementId>,
    label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    config: FormConfig,
    form: ElementId,
    in_flight: Option<InFlight>,
}

impl ContactForm {
    /// Bind to the page's first form; `None` if there is none.
    pub fn attach<D: Document + ?Sized>(config: FormConfig, doc: &D) -> Option<Self> {
        let form = doc.query_first(&Selector::tag("form"))?;
        Some(Self {
            config,
            form,
            in_flight: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn form(&self) -> ElementId {
        self.form
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    fn submit_button<D: Document + ?Sized>(&self, doc: &D) -> Option<ElementId> {
        doc.query_within(self.form, &Selector::tag("button"))
            .into_iter()
            .find(|&b| doc.attribute(b, "type").as_deref() == Some("submit"))
    }

    pub fn on_submit<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<Task>,
        now: Duration,
        fields: &FormFields,
    ) -> Result<SubmitOutcome> {
        if self.in_flight.is_some() {
            tracing::debug!(message = "form.busy");
            return Ok(SubmitOutcome::Busy);
        }
        let errors = validate(fields);
        if !errors.is_empty() {
            tracing::debug!(message = "form.invalid", errors = errors.len());
            return Ok(SubmitOutcome::Rejected(errors.join(", ")));
        }
        let button = self.submit_button(doc);
        let label = button.and_then(|b| doc.text(b));
        self.in_flight = Some(InFlight { button, label });
        scheduler.schedule_after(now, self.config.submit_after(), Task::FormSubmitted);
        tracing::debug!(message = "form.sending");
        if let Some(button) = button {
            doc.set_text(button, &self.config.sending_label)?;
            doc.set_disabled(button, true)?;
        }
        Ok(SubmitOutcome::Sending)
    }

    /// Message to show once a submission completes.
    #[must_use]
    pub fn success_message(&self) -> &str {
        &self.config.success_message
    }

    /// The simulated request finished: reset the form and restore the
    /// button. Returns `false` if nothing was in flight.
    pub fn on_submitted<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<bool> {
        let Some(flight) = self.in_flight.take() else {
            return Ok(false);
        };
        tracing::debug!(message = "form.sent");
        doc.reset_form(self.form)?;
        if let Some(button) = flight.button {
            doc.set_text(button, flight.label.as_deref().unwrap_or_default())?;
            doc.set_disabled(button, false)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefx_core::memory::MemoryDocument;
    use pretty_assertions::assert_eq;

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

    #[test]
    fn missing_first_name() {
        assert_eq!(
            validate(&fields("", "Doe", "x@y.com", "hi")),
            vec!["First name is required".to_string()]
        );
    }

    #[test]
    fn bad_email() {
        assert_eq!(
            validate(&fields("A", "B", "not-an-email", "hi")),
            vec!["Please enter a valid email address".to_string()]
        );
    }

    #[test]
    fn everything_missing_in_order() {
        assert_eq!(
            validate(&FormFields::new()),
            vec![
                "First name is required",
                "Last name is required",
                "Email is required",
                "Message is required",
            ]
        );
    }

    #[test]
    fn whitespace_email_is_both_required_and_invalid() {
        assert_eq!(
            validate(&fields("A", "B", "   ", "hi")),
            vec!["Email is required", "Please enter a valid email address"]
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@b.c"));
        assert!(!is_valid_email("a@@b.c"));
    }

    fn form_page() -> (MemoryDocument, ElementId, ElementId) {
        let mut doc = MemoryDocument::default();
        let form = doc.element("form").append();
        let button = doc
            .element("button")
            .attr("type", "submit")
            .text("Send Message")
            .child_of(form)
            .append();
        (doc, form, button)
    }

    #[test]
    fn submission_lifecycle() {
        let (mut doc, form, button) = form_page();
        let mut contact = ContactForm::attach(FormConfig::default(), &doc).expect("form");
        let mut sched = Scheduler::new();
        let ok = fields("Ada", "Lovelace", "ada@example.com", "hello");

        let outcome = contact
            .on_submit(&mut doc, &mut sched, Duration::ZERO, &ok)
            .expect("submit");
        assert_eq!(outcome, SubmitOutcome::Sending);
        assert_eq!(doc.text(button).as_deref(), Some("Sending..."));
        assert!(doc.is_disabled(button));

        let again = contact
            .on_submit(&mut doc, &mut sched, Duration::from_millis(10), &ok)
            .expect("again");
        assert_eq!(again, SubmitOutcome::Busy);
        assert_eq!(sched.pending_timers(), 1);

        let due = sched.pop_due(Duration::from_millis(2000)).expect("due");
        assert_eq!(due.task, Task::FormSubmitted);
        assert!(contact.on_submitted(&mut doc).expect("done"));
        assert!(!contact.on_submitted(&mut doc).expect("nothing in flight"));
        assert_eq!(
            contact.success_message(),
            "Thank you! Your message has been sent successfully."
        );
        assert_eq!(doc.form_resets(), &[form]);
        assert_eq!(doc.text(button).as_deref(), Some("Send Message"));
        assert!(!doc.is_disabled(button));
        assert!(!contact.is_sending());
    }

    #[test]
    fn rejected_submission_schedules_nothing() {
        let (mut doc, _, button) = form_page();
        let mut contact = ContactForm::attach(FormConfig::default(), &doc).expect("form");
        let mut sched = Scheduler::new();
        let outcome = contact
            .on_submit(&mut doc, &mut sched, Duration::ZERO, &fields("", "", "x", ""))
            .expect("submit");
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(
                "First name is required, Last name is required, Message is required, \
                 Please enter a valid email address"
                    .to_string()
            )
        );
        assert_eq!(sched.pending_timers(), 0);
        assert!(!doc.is_disabled(button));
    }
}

//! Contact form validation.
//!
//! Fields are validated on blur and again, all required fields at once, when
//! the form is submitted. Native submission never happens: a valid form is
//! collected into a [`Submission`] and handed to an [`Outbox`].
//!
//! ## Rules
//!
//! Evaluated against the trimmed value, in order; the first failure wins.
//!
//! | Rule | Message |
//! |------|---------|
//! | `required` and empty | `This field is required` |
//! | `type="email"`, non-empty, not `local@domain.tld` | `Please enter a valid email` |
//! | `minlength="N"` and fewer than N characters | `Minimum N characters required` |
//!
//! ## States
//!
//! ```text
//! field:  Untouched ──blur / submit──▶ Valid | Invalid(message)
//!                 ◀──────reset────────
//! form:   Idle ──submit──▶ Validating ──▶ Submitting ──▶ Idle
//!                                    └──▶ Rejected
//! ```

use crate::config::{Classes, FormConfig, InteractConfig};
use crate::dom::{Document, EventCtx, EventKind, Target, parse_int};
use regex::Regex;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::LazyLock;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Constraints declared on one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    pub required: bool,
    pub email: bool,
    pub min_length: Option<i64>,
}

impl FieldRules {
    pub fn from_element<D: Document>(doc: &D, field: &D::Element) -> Self {
        Self {
            required: doc.has_attribute(field, "required"),
            email: doc.input_type(field) == "email",
            min_length: doc
                .attribute(field, "minlength")
                .as_deref()
                .and_then(parse_int),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldStatus {
    #[default]
    Untouched,
    Valid,
    Invalid(String),
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldStatus::Valid)
    }

    pub fn message(&self) -> &str {
        match self {
            FieldStatus::Invalid(message) => message,
            _ => "",
        }
    }
}

/// Validate a raw field value. Pure, so repeated calls agree.
pub fn validate_value(rules: &FieldRules, raw: &str) -> FieldStatus {
    let value = raw.trim();
    if rules.required && value.is_empty() {
        return FieldStatus::Invalid(REQUIRED_MESSAGE.to_string());
    }
    if rules.email && !value.is_empty() && !is_valid_email(value) {
        return FieldStatus::Invalid(EMAIL_MESSAGE.to_string());
    }
    if let Some(min) = rules.min_length {
        let length = i64::try_from(value.chars().count()).unwrap_or(i64::MAX);
        if length < min {
            return FieldStatus::Invalid(format!("Minimum {min} characters required"));
        }
    }
    FieldStatus::Valid
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Rejected,
}

/// Named field values of a submitted form, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Submission {
    pub fields: Vec<(String, String)>,
}

impl Submission {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Fields as a JSON object. A repeated name keeps its last value.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Where valid submissions go.
pub trait Outbox {
    fn send(&self, submission: &Submission);
}

/// Logs submissions and sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOutbox;

impl Outbox for LogOutbox {
    fn send(&self, submission: &Submission) {
        tracing::info!(fields = %submission.to_json(), "form submitted");
    }
}

/// Keeps every submission in memory.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: RefCell<Vec<Submission>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Submission> {
        self.sent.borrow().clone()
    }
}

impl Outbox for MemoryOutbox {
    fn send(&self, submission: &Submission) {
        self.sent.borrow_mut().push(submission.clone());
    }
}

pub struct FormValidator<D: Document> {
    doc: D,
    form: D::Element,
    fields: Vec<D::Element>,
    statuses: RefCell<Vec<(D::Element, FieldStatus)>>,
    phase: Cell<FormPhase>,
    outbox: Rc<dyn Outbox>,
    config: FormConfig,
    classes: Classes,
}

impl<D: Document> FormValidator<D> {
    pub fn new(doc: &D, form: D::Element, config: &InteractConfig, outbox: Rc<dyn Outbox>) -> Self {
        let fields = doc.query_within(&form, &config.selectors.form_fields);
        Self {
            doc: doc.clone(),
            form,
            fields,
            statuses: RefCell::new(Vec::new()),
            phase: Cell::new(FormPhase::Idle),
            outbox,
            config: config.form.clone(),
            classes: config.classes.clone(),
        }
    }

    pub fn form(&self) -> &D::Element {
        &self.form
    }

    pub fn fields(&self) -> &[D::Element] {
        &self.fields
    }

    pub fn phase(&self) -> FormPhase {
        self.phase.get()
    }

    pub fn status(&self, field: &D::Element) -> FieldStatus {
        self.statuses
            .borrow()
            .iter()
            .find(|(el, _)| el == field)
            .map(|(_, s)| s.clone())
            .unwrap_or_default()
    }

    /// Validate one field and show the result next to it.
    pub fn validate_field(&self, field: &D::Element) -> bool {
        let rules = FieldRules::from_element(&self.doc, field);
        let status = validate_value(&rules, &self.doc.value(field));
        self.show(field, &status);
        let valid = status.is_valid();
        self.record(field, status);
        valid
    }

    /// Validate every required field, all of them, so each shows its message.
    pub fn validate(&self) -> bool {
        self.phase.set(FormPhase::Validating);
        let required = self.doc.query_within(&self.form, "[required]");
        // Every field is validated, not just up to the first failure.
        let results: Vec<bool> = required.iter().map(|f| self.validate_field(f)).collect();
        let valid = results.iter().all(|ok| *ok);
        self.phase.set(if valid {
            FormPhase::Submitting
        } else {
            FormPhase::Rejected
        });
        valid
    }

    /// Intercepted submit: validate, then send, notify and reset.
    pub fn handle_submit(&self, ctx: &mut EventCtx) {
        ctx.prevent_default();
        if !self.validate() {
            tracing::debug!("form rejected");
            return;
        }
        let submission = self.collect();
        self.outbox.send(&submission);
        self.show_notice(&self.config.success_message);
        self.reset();
    }

    /// Named control values in document order.
    pub fn collect(&self) -> Submission {
        let fields = self
            .fields
            .iter()
            .filter_map(|el| {
                let name = self.doc.attribute(el, "name").filter(|n| !n.is_empty())?;
                Some((name, self.doc.value(el)))
            })
            .collect();
        Submission { fields }
    }

    /// Restore initial values and return every field to untouched.
    pub fn reset(&self) {
        self.doc.reset_form(&self.form);
        let touched: Vec<D::Element> = self
            .statuses
            .borrow_mut()
            .drain(..)
            .map(|(el, _)| el)
            .collect();
        for field in &touched {
            self.show(field, &FieldStatus::Untouched);
        }
        self.phase.set(FormPhase::Idle);
    }

    fn record(&self, field: &D::Element, status: FieldStatus) {
        let mut statuses = self.statuses.borrow_mut();
        match statuses.iter_mut().find(|(el, _)| el == field) {
            Some(entry) => entry.1 = status,
            None => statuses.push((field.clone(), status)),
        }
    }

    fn show(&self, field: &D::Element, status: &FieldStatus) {
        let doc = &self.doc;
        let (error, success) = (&self.classes.field_error, &self.classes.field_success);
        match status {
            FieldStatus::Untouched => {
                doc.remove_class(field, error);
                doc.remove_class(field, success);
            }
            FieldStatus::Valid => {
                doc.remove_class(field, error);
                doc.add_class(field, success);
            }
            FieldStatus::Invalid(_) => {
                doc.remove_class(field, success);
                doc.add_class(field, error);
            }
        }
        let slot = doc
            .next_sibling(field)
            .filter(|slot| doc.has_class(slot, &self.classes.error_message));
        if let Some(slot) = slot {
            doc.set_text(&slot, status.message());
        }
    }

    fn show_notice(&self, message: &str) {
        let doc = &self.doc;
        let Some(notice) = doc.create_element("div") else {
            return;
        };
        doc.add_class(&notice, &self.classes.form_message);
        doc.add_class(&notice, "success");
        doc.set_text(&notice, message);
        doc.append_child(&self.form, &notice);
        doc.set_timeout(
            self.config.notice_ms,
            Box::new(move |doc: &D| doc.remove(&notice)),
        );
    }
}

/// Bind validation to the contact form. `None` when the page has no form.
pub fn mount<D: Document>(
    doc: &D,
    config: &InteractConfig,
    outbox: Rc<dyn Outbox>,
) -> Option<Rc<FormValidator<D>>> {
    let form = doc.query(&config.selectors.contact_form)?;
    let validator = Rc::new(FormValidator::new(doc, form.clone(), config, outbox));

    // Listeners hold weak handles: the validator owns the document, which owns
    // the listeners.
    let handle = Rc::downgrade(&validator);
    doc.listen(
        Target::Element(form.clone()),
        EventKind::Submit,
        Box::new(move |_: &D, ctx: &mut EventCtx| {
            if let Some(validator) = handle.upgrade() {
                validator.handle_submit(ctx);
            }
        }),
    );
    for field in doc.query_within(&form, &config.selectors.blur_fields) {
        let handle = Rc::downgrade(&validator);
        let target = field.clone();
        doc.listen(
            Target::Element(field),
            EventKind::Blur,
            Box::new(move |_: &D, _: &mut EventCtx| {
                if let Some(validator) = handle.upgrade() {
                    validator.validate_field(&target);
                }
            }),
        );
    }
    tracing::debug!(fields = validator.fields().len(), "contact form mounted");
    Some(validator)
}

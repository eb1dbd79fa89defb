use crate::logging::log_submit;

use super::backend::FormBackend;
use super::toast::ToastQueue;
use super::validate::{validate, ValidationErrors};
use super::ContactForm;

pub const SENT_MESSAGE: &str = "Message sent successfully!";
pub const FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked locally; nothing was sent.
    Invalid(ValidationErrors),
    /// Backend accepted; the form was cleared.
    Sent,
    /// Backend or network failure; entered values were kept.
    Failed,
}

/// Form state plus the notifications it raises.
pub struct ContactController<B: FormBackend> {
    backend: B,
    form: ContactForm,
    errors: Option<ValidationErrors>,
    toasts: ToastQueue,
}

impl<B: FormBackend> ContactController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_toasts(backend, ToastQueue::default())
    }

    pub fn with_toasts(backend: B, toasts: ToastQueue) -> Self {
        Self {
            backend,
            form: ContactForm::default(),
            errors: None,
            toasts,
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn set_email(&mut self, email: &str) {
        self.form.email = email.to_string();
    }

    pub fn set_message(&mut self, message: &str) {
        self.form.message = message.to_string();
    }

    pub fn fill(&mut self, form: ContactForm) {
        self.form = form;
    }

    /// Field errors from the last submit attempt.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn submit(&mut self, now_ms: u64) -> SubmitOutcome {
        if let Err(errors) = validate(&self.form) {
            self.errors = Some(errors.clone());
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = None;

        match self.backend.submit(&self.form).await {
            Ok(()) => {
                log_submit(self.backend.endpoint(), "sent", None);
                self.form = ContactForm::default();
                self.toasts.success(SENT_MESSAGE, now_ms);
                SubmitOutcome::Sent
            }
            Err(err) => {
                log_submit(self.backend.endpoint(), "failed", Some(&err.to_string()));
                self.toasts.error(FAILED_MESSAGE, now_ms);
                SubmitOutcome::Failed
            }
        }
    }
}

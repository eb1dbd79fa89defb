//! Contact form: local validation, one JSON POST to a form backend, and a
//! toast for the outcome. Failures are reported, never retried.

pub mod backend;
pub mod controller;
pub mod toast;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use backend::{FormBackend, FormspreeBackend, SubmitError};
pub use controller::{ContactController, SubmitOutcome};
pub use toast::{Toast, ToastKind, ToastQueue};
pub use validate::{validate, Field, FieldError, ValidationErrors};

/// Wire body: `{"email": "...", "message": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(email: &str, message: &str) -> Self {
        Self {
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.message.is_empty()
    }
}

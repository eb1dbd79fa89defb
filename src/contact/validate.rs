use thiserror::Error;

use super::ContactForm;

/// Minimum message length in UTF-16 code units, the unit browsers measure
/// string length in.
pub const MIN_MESSAGE_CHARS: usize = 10;

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every failing field, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", render(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field.as_str(), e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn validate(form: &ContactForm) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if !is_valid_email(&form.email) {
        errors.push(FieldError {
            field: Field::Email,
            message: INVALID_EMAIL,
        });
    }
    if form.message.encode_utf16().count() < MIN_MESSAGE_CHARS {
        errors.push(FieldError {
            field: Field::Message,
            message: MESSAGE_TOO_SHORT,
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Syntactic address check.
///
/// Local part: `[A-Za-z0-9_'+.-]`, no leading dot, no `..`, and it must end
/// in `[A-Za-z0-9_+-]`. Domain: two or more dot-separated labels; labels start
/// alphanumeric and contain only alphanumerics and `-`; the last label is at
/// least two ASCII letters.
pub fn is_valid_email(input: &str) -> bool {
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    let Some(last) = local.chars().last() else {
        return false;
    };
    if local.starts_with('.') || local.contains("..") {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '-' | '.');
    local.chars().all(allowed) && (last.is_ascii_alphanumeric() || matches!(last, '_' | '+' | '-'))
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    rest.iter().all(|label| {
        let mut chars = label.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

//! Submit a contact message through the configured form backend.
//!
//! Usage: submit_contact <email> <message...>
//! Backend is taken from FORM_BASE_URL / FORM_ID.

use anyhow::{bail, Result};

use scrollspy::clock::{Clock, SystemClock};
use scrollspy::config::Config;
use scrollspy::contact::{ContactController, ContactForm, SubmitOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(email), message) = (args.next(), args.collect::<Vec<_>>().join(" ")) else {
        bail!("usage: submit_contact <email> <message...>");
    };

    let cfg = Config::from_env();
    let backend = cfg.form_backend()?;
    let mut controller = ContactController::with_toasts(backend, cfg.toasts());
    controller.fill(ContactForm::new(&email, &message));

    let outcome = controller.submit(SystemClock.now_ms()).await;
    if let SubmitOutcome::Invalid(errors) = &outcome {
        for err in errors.iter() {
            eprintln!("{}: {}", err.field.as_str(), err.message);
        }
        std::process::exit(2);
    }
    if let Some(toast) = controller.toasts().latest() {
        println!("{:?}: {}", toast.kind, toast.message);
    }
    if outcome == SubmitOutcome::Failed {
        std::process::exit(1);
    }
    Ok(())
}

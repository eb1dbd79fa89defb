use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::ContactForm;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend rejected submission with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Third-party form processor. One call, one POST; callers never retry.
#[async_trait]
pub trait FormBackend: Send + Sync {
    async fn submit(&self, form: &ContactForm) -> Result<(), SubmitError>;

    fn endpoint(&self) -> &str;
}

/// Posts the form as JSON to `{base_url}/{form_id}`.
pub struct FormspreeBackend {
    client: Client,
    endpoint: String,
}

impl FormspreeBackend {
    pub const DEFAULT_BASE_URL: &'static str = "https://formspree.io/f";

    pub fn new(base_url: &str, form_id: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), form_id);
        url::Url::parse(&endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl FormBackend for FormspreeBackend {
    async fn submit(&self, form: &ContactForm) -> Result<(), SubmitError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(form)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

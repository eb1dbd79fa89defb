use std::time::Duration;

use anyhow::{Context, Result};

use crate::contact::{FormspreeBackend, ToastQueue};
use crate::gallery::{Backoff, GalleryOptions, PollConfig};
use crate::reconciler::{ReconcilerConfig, SUPPRESSION_WINDOW_MS};
use crate::sections::{SectionRegistry, SiteProfile};

#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteProfile,
    /// JSON array of sections; overrides `site` when set.
    pub sections_path: Option<String>,
    pub suppression_window_ms: u64,
    pub form_base_url: String,
    pub form_id: String,
    pub form_timeout_ms: u64,
    pub toast_auto_close_ms: u64,
    pub gallery_poll_ms: u64,
    pub gallery_max_attempts: u32,
    pub gallery_cloud_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteProfile::Logistics,
            sections_path: None,
            suppression_window_ms: SUPPRESSION_WINDOW_MS,
            form_base_url: FormspreeBackend::DEFAULT_BASE_URL.to_string(),
            form_id: "mayclan-contact".to_string(),
            form_timeout_ms: 10_000,
            toast_auto_close_ms: 5_000,
            gallery_poll_ms: 500,
            gallery_max_attempts: 40,
            gallery_cloud_name: "makeup".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            site: SiteProfile::from_env(),
            sections_path: std::env::var("SECTIONS_PATH").ok(),
            suppression_window_ms: std::env::var("SUPPRESSION_WINDOW_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.suppression_window_ms),
            form_base_url: std::env::var("FORM_BASE_URL").unwrap_or(d.form_base_url),
            form_id: std::env::var("FORM_ID").unwrap_or(d.form_id),
            form_timeout_ms: std::env::var("FORM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.form_timeout_ms),
            toast_auto_close_ms: std::env::var("TOAST_AUTO_CLOSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.toast_auto_close_ms),
            gallery_poll_ms: std::env::var("GALLERY_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.gallery_poll_ms),
            gallery_max_attempts: std::env::var("GALLERY_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.gallery_max_attempts),
            gallery_cloud_name: std::env::var("GALLERY_CLOUD_NAME").unwrap_or(d.gallery_cloud_name),
        }
    }

    pub fn registry(&self) -> Result<SectionRegistry> {
        match &self.sections_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading sections from {}", path))?;
                SectionRegistry::from_json(&raw).with_context(|| format!("invalid sections in {}", path))
            }
            None => Ok(SectionRegistry::from_profile(self.site)),
        }
    }

    pub fn reconciler(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            suppression_window_ms: self.suppression_window_ms,
        }
    }

    pub fn form_backend(&self) -> Result<FormspreeBackend> {
        FormspreeBackend::new(
            &self.form_base_url,
            &self.form_id,
            Duration::from_millis(self.form_timeout_ms),
        )
    }

    pub fn toasts(&self) -> ToastQueue {
        ToastQueue::new(self.toast_auto_close_ms)
    }

    pub fn gallery_poll(&self) -> PollConfig {
        PollConfig {
            max_attempts: self.gallery_max_attempts,
            interval_ms: self.gallery_poll_ms,
            backoff: Backoff::Fixed,
        }
    }

    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions::new(&self.gallery_cloud_name)
    }
}

//! Media gallery widget lifecycle.
//!
//! The widget comes from a script that loads after the page, so its factory
//! may not exist yet when the gallery mounts. [`GallerySlot::init`] polls for
//! it with a bounded budget, renders exactly once, and [`GallerySlot::teardown`]
//! destroys the instance when the widget supports it.

pub mod poll;

use serde::Serialize;
use thiserror::Error;

use crate::logging::{log, obj, v_str, Domain, Level};

pub use poll::{poll_until, Backoff, PollConfig, PollError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeProps {
    pub primary: String,
    pub on_primary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub breakpoint: u32,
    pub carousel_style: String,
    pub carousel_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,
}

/// Options handed to the widget factory, serialized in its camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryOptions {
    pub cloud_name: String,
    pub aspect_ratio: String,
    pub zoom: bool,
    pub bg_color: String,
    pub theme_props: ThemeProps,
    pub media_assets: Vec<MediaAsset>,
    pub carousel_style: String,
    pub carousel_location: String,
    pub viewport_breakpoints: Vec<Breakpoint>,
}

impl GalleryOptions {
    pub fn new(cloud_name: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            ..Self::default()
        }
    }
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            cloud_name: "makeup".to_string(),
            aspect_ratio: "16:9".to_string(),
            zoom: false,
            bg_color: "#F9FAFB".to_string(),
            theme_props: ThemeProps {
                primary: "#000000".to_string(),
                on_primary: "#FFFFFF".to_string(),
            },
            media_assets: vec![
                MediaAsset {
                    tag: "web".to_string(),
                    media_type: None,
                    transformation: Some(serde_json::json!({ "crop": "fill" })),
                },
                MediaAsset {
                    tag: "web-video".to_string(),
                    media_type: Some("video".to_string()),
                    transformation: None,
                },
            ],
            carousel_style: "thumbnails".to_string(),
            carousel_location: "left".to_string(),
            viewport_breakpoints: vec![
                Breakpoint {
                    breakpoint: 768,
                    carousel_style: "thumbnails".to_string(),
                    carousel_location: "bottom".to_string(),
                    navigation: None,
                },
                Breakpoint {
                    breakpoint: 480,
                    carousel_style: "indicators".to_string(),
                    carousel_location: "bottom".to_string(),
                    navigation: Some("always".to_string()),
                },
            ],
        }
    }
}

/// A created widget instance.
pub trait GalleryWidget {
    fn render(&mut self) -> anyhow::Result<()>;

    /// `None` when the widget has no destroy hook.
    fn destroy(&mut self) -> Option<anyhow::Result<()>> {
        None
    }
}

/// Global the widget script installs once loaded.
pub trait WidgetHost {
    type Widget: GalleryWidget;

    /// `None` while the script has not loaded yet.
    fn gallery_widget(&self, options: &GalleryOptions) -> Option<Self::Widget>;
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Unavailable(#[from] PollError),
    #[error("gallery render failed: {0}")]
    Render(anyhow::Error),
}

/// Holds at most one live widget instance.
pub struct GallerySlot<W: GalleryWidget> {
    widget: Option<W>,
}

impl<W: GalleryWidget> Default for GallerySlot<W> {
    fn default() -> Self {
        Self { widget: None }
    }
}

impl<W: GalleryWidget> GallerySlot<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.widget.is_some()
    }

    pub fn widget(&self) -> Option<&W> {
        self.widget.as_ref()
    }

    /// Replace any previous instance with a freshly rendered one.
    pub async fn init<H>(&mut self, host: &H, options: &GalleryOptions, poll: &PollConfig) -> Result<(), GalleryError>
    where
        H: WidgetHost<Widget = W>,
    {
        self.teardown();
        let mut widget = poll_until(poll, "gallery_widget", || host.gallery_widget(options)).await?;
        widget.render().map_err(GalleryError::Render)?;
        log(
            Level::Info,
            Domain::Gallery,
            "rendered",
            obj(&[("cloud_name", v_str(&options.cloud_name))]),
        );
        self.widget = Some(widget);
        Ok(())
    }

    /// Best-effort destroy. Failures are logged and the slot is emptied anyway.
    pub fn teardown(&mut self) {
        let Some(mut widget) = self.widget.take() else {
            return;
        };
        match widget.destroy() {
            Some(Ok(())) => log(Level::Debug, Domain::Gallery, "destroyed", obj(&[])),
            Some(Err(err)) => log(
                Level::Warn,
                Domain::Gallery,
                "destroy_failed",
                obj(&[("error", v_str(&err.to_string()))]),
            ),
            None => {}
        }
    }
}

impl<W: GalleryWidget> Drop for GallerySlot<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

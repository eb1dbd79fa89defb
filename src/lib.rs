//! Scroll-driven active-section tracking for single-page sites.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Intersection │────►│  Observers   │────►│  Reconciler  │
//! │   (host)     │     │ (per section)│     │ (1s window)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                                  │
//!                                                  ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │  Navigation  │◄───►│    Store     │
//!                      │   (header)   │     │  (watched)   │
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! Around the tracker sit the contact form client ([`contact`]) and the
//! late-loading media gallery ([`gallery`]).

pub mod clock;
pub mod config;
pub mod contact;
pub mod gallery;
pub mod logging;
pub mod navigation;
pub mod reconciler;
pub mod sections;
pub mod session;
pub mod store;
pub mod visibility;

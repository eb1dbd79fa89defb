//! Per-section visibility observation.
//!
//! The host layout engine supplies either raw intersection ratios or the
//! element/viewport boxes. An observer turns that stream into `in_view`
//! transitions against its threshold and never touches shared state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sections::SectionId;

// Ratios are computed in floating point; 0.75 of a box may come out as 0.7499999.
const RATIO_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Fraction of `element` inside `viewport`, in [0, 1].
///
/// A zero-area element counts as fully visible when its origin lies in the
/// viewport and invisible otherwise.
pub fn intersection_ratio(element: &Rect, viewport: &Rect) -> f64 {
    let area = element.area();
    if area <= 0.0 {
        return if viewport.contains_point(element.x, element.y) { 1.0 } else { 0.0 };
    }
    match element.intersection(viewport) {
        Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
        None => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("threshold {0} is outside [0, 1]")]
pub struct ThresholdError(pub f64);

/// Minimum visible fraction of a section for it to count as in view.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(0.75);
    pub const PRIMARY: Threshold = Threshold(0.5);

    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdError(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Threshold 0 means any positive intersection.
    pub fn is_met_by(self, ratio: f64) -> bool {
        if self.0 == 0.0 {
            ratio > 0.0
        } else {
            ratio + RATIO_EPSILON >= self.0
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityReport {
    pub section: SectionId,
    pub in_view: bool,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    section: SectionId,
    threshold: Threshold,
    in_view: bool,
    attached: bool,
}

impl VisibilityObserver {
    pub fn new(section: SectionId, threshold: Threshold) -> Self {
        Self {
            section,
            threshold,
            in_view: false,
            attached: true,
        }
    }

    pub fn section(&self) -> SectionId {
        self.section
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Feed one intersection sample. Returns a report only when `in_view` flips.
    pub fn observe_ratio(&mut self, ratio: f64) -> Option<VisibilityReport> {
        if !self.attached || ratio.is_nan() {
            return None;
        }
        let ratio = ratio.clamp(0.0, 1.0);
        let now_in_view = self.threshold.is_met_by(ratio);
        if now_in_view == self.in_view {
            return None;
        }
        self.in_view = now_in_view;
        Some(VisibilityReport {
            section: self.section,
            in_view: now_in_view,
            ratio,
        })
    }

    pub fn observe_layout(&mut self, element: &Rect, viewport: &Rect) -> Option<VisibilityReport> {
        self.observe_ratio(intersection_ratio(element, viewport))
    }

    /// Stop observing. Later samples are dropped.
    pub fn detach(&mut self) {
        self.attached = false;
        self.in_view = false;
    }
}

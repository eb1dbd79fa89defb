//! Visibility-driven activation: (store, report, now) -> Activation
//!
//! The reconciler is the only writer that promotes a section because it became
//! visible. A manual click scrolls the page programmatically and sweeps other
//! sections through the viewport, so promotions are ignored for a short window
//! after each click. Leaving the viewport never demotes a section.

use crate::sections::SectionId;
use crate::store::ActiveSectionStore;
use crate::visibility::VisibilityReport;

pub const SUPPRESSION_WINDOW_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The section became the active one.
    Promoted,
    /// The section was already active; nothing changed.
    AlreadyActive,
    /// Inside the post-click window; `remaining_ms` until promotions resume.
    Suppressed { remaining_ms: u64 },
    /// The report was a leave transition (or there was nothing in view).
    NotInView,
}

impl Activation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::Promoted => "promoted",
            Activation::AlreadyActive => "already_active",
            Activation::Suppressed { .. } => "suppressed",
            Activation::NotInView => "not_in_view",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Promotions need strictly more than this many ms since the last click.
    pub suppression_window_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            suppression_window_ms: SUPPRESSION_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionActivationReconciler {
    cfg: ReconcilerConfig,
}

impl SectionActivationReconciler {
    pub fn new(cfg: ReconcilerConfig) -> Self {
        Self { cfg }
    }

    pub fn suppression_window_ms(&self) -> u64 {
        self.cfg.suppression_window_ms
    }

    /// Time left in the suppression window, or `None` if promotions are allowed.
    ///
    /// A click stamped after `now` (clock skew) counts as having just happened.
    pub fn suppression_remaining(&self, last_click_ms: Option<u64>, now_ms: u64) -> Option<u64> {
        let last = last_click_ms?;
        let elapsed = now_ms.saturating_sub(last);
        if elapsed > self.cfg.suppression_window_ms {
            None
        } else {
            Some((self.cfg.suppression_window_ms - elapsed).saturating_add(1))
        }
    }

    pub fn reconcile(
        &self,
        store: &mut ActiveSectionStore,
        report: VisibilityReport,
        now_ms: u64,
    ) -> Activation {
        if !report.in_view {
            return Activation::NotInView;
        }
        self.promote(store, report.section, now_ms)
    }

    /// Resolve reports that arrived in the same evaluation pass.
    ///
    /// Among the sections that entered the viewport, the first in document
    /// order wins; registration or delivery order plays no part.
    pub fn reconcile_frame(
        &self,
        store: &mut ActiveSectionStore,
        reports: &[VisibilityReport],
        now_ms: u64,
    ) -> Activation {
        match reports.iter().filter(|r| r.in_view).map(|r| r.section).min() {
            Some(section) => self.promote(store, section, now_ms),
            None => Activation::NotInView,
        }
    }

    fn promote(&self, store: &mut ActiveSectionStore, section: SectionId, now_ms: u64) -> Activation {
        if let Some(remaining_ms) = self.suppression_remaining(store.last_manual_click(), now_ms) {
            return Activation::Suppressed { remaining_ms };
        }
        if store.set_active_section(section) {
            Activation::Promoted
        } else {
            Activation::AlreadyActive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{SectionRegistry, SiteProfile};

    fn setup() -> (SectionRegistry, ActiveSectionStore, SectionActivationReconciler) {
        let reg = SectionRegistry::from_profile(SiteProfile::Logistics);
        let store = ActiveSectionStore::new(reg.default_section());
        (reg, store, SectionActivationReconciler::default())
    }

    fn entered(section: SectionId) -> VisibilityReport {
        VisibilityReport { section, in_view: true, ratio: 0.8 }
    }

    #[test]
    fn test_promotes_without_prior_click() {
        let (reg, mut store, rec) = setup();
        let services = reg.lookup("Services").unwrap();
        assert_eq!(rec.reconcile(&mut store, entered(services), 0), Activation::Promoted);
        assert_eq!(store.active_section(), services);
    }

    #[test]
    fn test_leave_does_not_demote() {
        let (reg, mut store, rec) = setup();
        let services = reg.lookup("Services").unwrap();
        rec.reconcile(&mut store, entered(services), 0);
        let left = VisibilityReport { section: services, in_view: false, ratio: 0.1 };
        assert_eq!(rec.reconcile(&mut store, left, 10), Activation::NotInView);
        assert_eq!(store.active_section(), services);
    }

    #[test]
    fn test_window_boundary_is_strict() {
        let (reg, mut store, rec) = setup();
        let about = reg.lookup("About Us").unwrap();
        store.record_manual_click(10_000);
        assert_eq!(
            rec.reconcile(&mut store, entered(about), 11_000),
            Activation::Suppressed { remaining_ms: 1 }
        );
        assert_eq!(rec.reconcile(&mut store, entered(about), 11_001), Activation::Promoted);
    }

    #[test]
    fn test_future_click_suppresses() {
        let (reg, mut store, rec) = setup();
        store.record_manual_click(50_000);
        let about = reg.lookup("About Us").unwrap();
        assert_eq!(
            rec.reconcile(&mut store, entered(about), 40_000),
            Activation::Suppressed { remaining_ms: 1_001 }
        );
    }

    #[test]
    fn test_already_active() {
        let (reg, mut store, rec) = setup();
        let home = reg.default_section();
        assert_eq!(rec.reconcile(&mut store, entered(home), 0), Activation::AlreadyActive);
    }

    #[test]
    fn test_frame_tie_break_is_document_order() {
        let (reg, mut store, rec) = setup();
        let services = reg.lookup("Services").unwrap();
        let about = reg.lookup("About Us").unwrap();
        let contact = reg.lookup("Contact").unwrap();
        let reports = [entered(contact), entered(about), entered(services)];
        assert_eq!(rec.reconcile_frame(&mut store, &reports, 0), Activation::Promoted);
        assert_eq!(store.active_section(), services);
    }

    #[test]
    fn test_frame_ignores_leaves() {
        let (reg, mut store, rec) = setup();
        let services = reg.lookup("Services").unwrap();
        let contact = reg.lookup("Contact").unwrap();
        let reports = [
            VisibilityReport { section: services, in_view: false, ratio: 0.0 },
            entered(contact),
        ];
        rec.reconcile_frame(&mut store, &reports, 0);
        assert_eq!(store.active_section(), contact);
        assert_eq!(rec.reconcile_frame(&mut store, &[], 0), Activation::NotInView);
    }

    #[test]
    fn test_unbounded_window_saturates() {
        let rec = SectionActivationReconciler::new(ReconcilerConfig {
            suppression_window_ms: u64::MAX,
        });
        assert_eq!(rec.suppression_remaining(Some(100), 100), Some(u64::MAX));
        assert_eq!(rec.suppression_remaining(Some(100), 101), Some(u64::MAX));
        assert_eq!(rec.suppression_remaining(Some(0), u64::MAX), Some(1));
        assert_eq!(rec.suppression_remaining(None, 100), None);
    }

    #[test]
    fn test_custom_window() {
        let (reg, mut store, _) = setup();
        let rec = SectionActivationReconciler::new(ReconcilerConfig { suppression_window_ms: 0 });
        store.record_manual_click(100);
        let services = reg.lookup("Services").unwrap();
        assert!(matches!(
            rec.reconcile(&mut store, entered(services), 100),
            Activation::Suppressed { .. }
        ));
        assert_eq!(rec.reconcile(&mut store, entered(services), 101), Activation::Promoted);
    }
}

//! Session context: one per page lifetime.
//!
//! ```text
//! host intersection ──► VisibilityObserver ──► Reconciler ──► ActiveSectionStore ──► NavigationView
//!                                                                  ▲                       │
//!                                                                  └──── click ◄───────────┘
//! ```
//!
//! The session owns every piece and is handed by reference to whatever drives
//! it, so there is no ambient global state.

use std::collections::BTreeMap;

use tokio::sync::watch;

use crate::clock::Clock;
use crate::logging::{log_activation, log_click, log_crossing, log_foreign_section};
use crate::reconciler::{Activation, ReconcilerConfig, SectionActivationReconciler};
use crate::sections::{SectionId, SectionRegistry};
use crate::store::{ActiveSectionState, ActiveSectionStore};
use crate::visibility::{intersection_ratio, Rect, Threshold, VisibilityObserver, VisibilityReport};

/// Instruction for the host to scroll to an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub section: SectionId,
    pub anchor: String,
}

pub struct Session<C: Clock> {
    registry: SectionRegistry,
    store: ActiveSectionStore,
    reconciler: SectionActivationReconciler,
    observers: BTreeMap<SectionId, VisibilityObserver>,
    clock: C,
}

impl<C: Clock> Session<C> {
    pub fn new(registry: SectionRegistry, clock: C) -> Self {
        Self::with_config(registry, clock, ReconcilerConfig::default())
    }

    pub fn with_config(registry: SectionRegistry, clock: C, cfg: ReconcilerConfig) -> Self {
        let store = ActiveSectionStore::new(registry.default_section());
        Self {
            registry,
            store,
            reconciler: SectionActivationReconciler::new(cfg),
            observers: BTreeMap::new(),
            clock,
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ActiveSectionStore {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn active_section(&self) -> SectionId {
        self.store.active_section()
    }

    pub fn active_name(&self) -> &str {
        self.registry.name(self.store.active_section())
    }

    pub fn subscribe(&self) -> watch::Receiver<ActiveSectionState> {
        self.store.subscribe()
    }

    /// Start observing a section with its registry threshold.
    ///
    /// Returns `false` for an id this session's registry did not mint.
    pub fn mount(&mut self, section: SectionId) -> bool {
        if !self.accepts(section, "mount") {
            return false;
        }
        let threshold = self.registry.threshold(section);
        self.mount_with_threshold(section, threshold)
    }

    /// Start observing a section. Remounting replaces the previous observer.
    pub fn mount_with_threshold(&mut self, section: SectionId, threshold: Threshold) -> bool {
        if !self.accepts(section, "mount") {
            return false;
        }
        self.observers
            .insert(section, VisibilityObserver::new(section, threshold));
        true
    }

    pub fn mount_all(&mut self) {
        let ids: Vec<SectionId> = self.registry.iter().collect();
        for id in ids {
            self.mount(id);
        }
    }

    /// Stop observing a section. No promotion can originate from it afterwards.
    pub fn unmount(&mut self, section: SectionId) -> bool {
        match self.observers.remove(&section) {
            Some(mut observer) => {
                observer.detach();
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self, section: SectionId) -> bool {
        self.observers.contains_key(&section)
    }

    pub fn in_view(&self, section: SectionId) -> bool {
        self.observers.get(&section).is_some_and(|o| o.in_view())
    }

    /// Feed one intersection sample for a section.
    ///
    /// Returns `None` when the section is not mounted or its visibility did
    /// not flip.
    pub fn on_intersection(&mut self, section: SectionId, ratio: f64) -> Option<Activation> {
        let report = self.observe(section, ratio)?;
        let now = self.clock.now_ms();
        let outcome = self.reconciler.reconcile(&mut self.store, report, now);
        log_activation(self.registry.name(section), outcome.as_str(), now);
        Some(outcome)
    }

    pub fn on_layout(&mut self, section: SectionId, element: &Rect, viewport: &Rect) -> Option<Activation> {
        self.on_intersection(section, intersection_ratio(element, viewport))
    }

    /// Feed samples delivered together in one layout pass.
    ///
    /// Every observer is updated first. Only the state each section settles on
    /// by the end of the pass counts, so a flip undone within the same pass is
    /// dropped. Simultaneous entries are then resolved in document order.
    /// Returns `None` if no section ends the pass in a different state.
    pub fn on_frame(&mut self, samples: &[(SectionId, f64)]) -> Option<Activation> {
        // section -> (in view before the pass, latest report)
        let mut settled: BTreeMap<SectionId, (bool, VisibilityReport)> = BTreeMap::new();
        for &(section, ratio) in samples {
            let Some(was_in_view) = self.observers.get(&section).map(|o| o.in_view()) else {
                continue;
            };
            let before = settled.get(&section).map_or(was_in_view, |&(before, _)| before);
            if let Some(report) = self.observe(section, ratio) {
                settled.insert(section, (before, report));
            }
        }
        let reports: Vec<VisibilityReport> = settled
            .into_values()
            .filter(|(before, report)| report.in_view != *before)
            .map(|(_, report)| report)
            .collect();
        if reports.is_empty() {
            return None;
        }
        let now = self.clock.now_ms();
        let outcome = self.reconciler.reconcile_frame(&mut self.store, &reports, now);
        log_activation(self.active_name(), outcome.as_str(), now);
        Some(outcome)
    }

    /// Manual navigation: highlight first, stamp the click, then hand the
    /// scroll to the host.
    ///
    /// An id this session's registry did not mint is refused before any state
    /// changes.
    pub fn click(&mut self, section: SectionId) -> Option<ScrollRequest> {
        if !self.accepts(section, "click") {
            return None;
        }
        let now = self.clock.now_ms();
        self.store.set_active_section(section);
        self.store.record_manual_click(now);
        let anchor = self.registry.anchor(section).to_string();
        log_click(self.registry.name(section), &anchor, now);
        Some(ScrollRequest { section, anchor })
    }

    fn accepts(&self, section: SectionId, op: &str) -> bool {
        let ok = self.registry.contains(section);
        if !ok {
            log_foreign_section(op, section.index());
        }
        ok
    }

    /// Unmounted and foreign ids have no observer and yield nothing.
    fn observe(&mut self, section: SectionId, ratio: f64) -> Option<VisibilityReport> {
        let observer = self.observers.get_mut(&section)?;
        let report = observer.observe_ratio(ratio)?;
        log_crossing(
            self.registry.name(section),
            report.in_view,
            report.ratio,
            observer.threshold().value(),
        );
        Some(report)
    }
}

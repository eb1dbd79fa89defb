//! Active-section store: the only shared mutable state of a session.
//!
//! Readers subscribe through a `tokio::sync::watch` channel and always see one
//! consistent snapshot. Mutations that leave the snapshot unchanged do not
//! notify anyone.

use tokio::sync::watch;

use crate::sections::SectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSectionState {
    pub active: SectionId,
    /// `None` until the first manual click, i.e. infinitely long ago.
    pub last_manual_click_ms: Option<u64>,
}

#[derive(Debug)]
pub struct ActiveSectionStore {
    state: watch::Sender<ActiveSectionState>,
}

impl ActiveSectionStore {
    pub fn new(initial: SectionId) -> Self {
        let (state, _) = watch::channel(ActiveSectionState {
            active: initial,
            last_manual_click_ms: None,
        });
        Self { state }
    }

    pub fn active_section(&self) -> SectionId {
        self.state.borrow().active
    }

    pub fn last_manual_click(&self) -> Option<u64> {
        self.state.borrow().last_manual_click_ms
    }

    pub fn snapshot(&self) -> ActiveSectionState {
        *self.state.borrow()
    }

    /// Unconditional overwrite. Returns whether the active section changed.
    pub fn set_active_section(&mut self, section: SectionId) -> bool {
        self.state.send_if_modified(|state| {
            if state.active == section {
                return false;
            }
            state.active = section;
            true
        })
    }

    pub fn record_manual_click(&mut self, ts_ms: u64) {
        self.state.send_if_modified(|state| {
            if state.last_manual_click_ms == Some(ts_ms) {
                return false;
            }
            state.last_manual_click_ms = Some(ts_ms);
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<ActiveSectionState> {
        self.state.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }
}

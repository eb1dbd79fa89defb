//! Navigation header model.
//!
//! Widgets receive `NavLink`s and report clicks back through the session;
//! they never hold their own copy of which section is active.

use tokio::sync::watch;

use crate::clock::Clock;
use crate::sections::{SectionId, SectionRegistry};
use crate::session::{ScrollRequest, Session};
use crate::store::ActiveSectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub section: SectionId,
    pub name: String,
    pub anchor: String,
    pub active: bool,
}

pub struct NavigationView {
    state: watch::Receiver<ActiveSectionState>,
    renders: u64,
}

impl NavigationView {
    pub fn new<C: Clock>(session: &Session<C>) -> Self {
        Self {
            state: session.subscribe(),
            renders: 0,
        }
    }

    pub fn active_section(&self) -> SectionId {
        self.state.borrow().active
    }

    /// Link list in document order with exactly one link marked active.
    pub fn links(&self, registry: &SectionRegistry) -> Vec<NavLink> {
        let active = self.active_section();
        registry
            .iter()
            .map(|section| NavLink {
                section,
                name: registry.name(section).to_string(),
                anchor: registry.anchor(section).to_string(),
                active: section == active,
            })
            .collect()
    }

    /// Consume a pending change notification. Returns true when the header
    /// needs to re-render.
    pub fn refresh(&mut self) -> bool {
        match self.state.has_changed() {
            Ok(true) => {
                self.state.borrow_and_update();
                self.renders += 1;
                true
            }
            _ => false,
        }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// User clicked a link. `None` if the link's section is not in the session.
    pub fn click<C: Clock>(&mut self, session: &mut Session<C>, section: SectionId) -> Option<ScrollRequest> {
        session.click(section)
    }

    pub fn render_line(&self, registry: &SectionRegistry) -> String {
        self.links(registry)
            .iter()
            .map(|link| {
                if link.active {
                    format!("[{}]", link.name)
                } else {
                    link.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

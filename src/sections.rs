//! Section registry: the single authoritative enumeration of navigable sections.
//!
//! Consumers never match on display strings. They hold a [`SectionId`], which
//! only a registry can mint. Each id carries the tag of the registry that
//! minted it, so an id from another registry is never mistaken for one of ours.
//! Ids from the same registry compare in document order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::visibility::Threshold;

static NEXT_REGISTRY_TAG: AtomicU32 = AtomicU32::new(0);

// Field order matters: the derived ordering is document order within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId {
    registry: u32,
    index: usize,
}

impl SectionId {
    /// Position in document order, starting at 0.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Authored description of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub anchor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl SectionSpec {
    pub fn new(name: &str, anchor: &str) -> Self {
        Self {
            name: name.to_string(),
            anchor: anchor.to_string(),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("section registry is empty")]
    Empty,
    #[error("duplicate section name `{0}`")]
    DuplicateName(String),
    #[error("duplicate anchor `{0}`")]
    DuplicateAnchor(String),
    #[error("anchor `{0}` must be `#` followed by a fragment")]
    InvalidAnchor(String),
    #[error("threshold {value} for section `{name}` is outside [0, 1]")]
    InvalidThreshold { name: String, value: f64 },
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    anchor: String,
    threshold: Threshold,
}

/// Clones share the tag, and so accept each other's ids.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    tag: u32,
    entries: Vec<Entry>,
}

impl SectionRegistry {
    pub fn new(specs: Vec<SectionSpec>) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut names = HashSet::new();
        let mut anchors = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for (idx, spec) in specs.into_iter().enumerate() {
            if !names.insert(spec.name.clone()) {
                return Err(RegistryError::DuplicateName(spec.name));
            }
            let fragment = spec.anchor.strip_prefix('#').unwrap_or("");
            if fragment.is_empty() || fragment.chars().any(char::is_whitespace) {
                return Err(RegistryError::InvalidAnchor(spec.anchor));
            }
            if !anchors.insert(spec.anchor.clone()) {
                return Err(RegistryError::DuplicateAnchor(spec.anchor));
            }
            let threshold = match spec.threshold {
                Some(value) => Threshold::new(value).map_err(|_| RegistryError::InvalidThreshold {
                    name: spec.name.clone(),
                    value,
                })?,
                None => default_threshold(idx),
            };
            entries.push(Entry {
                name: spec.name,
                anchor: spec.anchor,
                threshold,
            });
        }

        Ok(Self::with_entries(entries))
    }

    pub fn from_profile(profile: SiteProfile) -> Self {
        // Presets are static and known to be valid.
        let entries = profile
            .specs()
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| Entry {
                name: spec.name,
                anchor: spec.anchor,
                threshold: default_threshold(idx),
            })
            .collect();
        Self::with_entries(entries)
    }

    fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            tag: NEXT_REGISTRY_TAG.fetch_add(1, Ordering::Relaxed),
            entries,
        }
    }

    fn id(&self, index: usize) -> SectionId {
        SectionId {
            registry: self.tag,
            index,
        }
    }

    fn entry(&self, id: SectionId) -> &Entry {
        assert!(self.contains(id), "section id {:?} was minted by another registry", id);
        &self.entries[id.index]
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let specs: Vec<SectionSpec> = serde_json::from_str(raw)?;
        Ok(Self::new(specs)?)
    }

    pub fn lookup(&self, name: &str) -> Option<SectionId> {
        self.entries.iter().position(|e| e.name == name).map(|i| self.id(i))
    }

    pub fn by_anchor(&self, anchor: &str) -> Option<SectionId> {
        self.entries.iter().position(|e| e.anchor == anchor).map(|i| self.id(i))
    }

    /// # Panics
    ///
    /// If `id` was not minted by this registry. Check with [`Self::contains`]
    /// at boundaries that accept outside ids.
    pub fn name(&self, id: SectionId) -> &str {
        &self.entry(id).name
    }

    pub fn anchor(&self, id: SectionId) -> &str {
        &self.entry(id).anchor
    }

    pub fn threshold(&self, id: SectionId) -> Threshold {
        self.entry(id).threshold
    }

    pub fn default_section(&self) -> SectionId {
        self.id(0)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        id.registry == self.tag && id.index < self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = SectionId> + '_ {
        (0..self.entries.len()).map(|i| self.id(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Threshold for a section authored without one.
fn default_threshold(index: usize) -> Threshold {
    // The first section fills most of the initial viewport.
    if index == 0 {
        Threshold::PRIMARY
    } else {
        Threshold::DEFAULT
    }
}

/// Built-in section layouts for the sites in this repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteProfile {
    /// Shipping and logistics site.
    Logistics,
    /// Fire and security site.
    FireSecurity,
}

impl SiteProfile {
    pub fn from_env() -> Self {
        match std::env::var("SITE").unwrap_or_default().as_str() {
            "fire-security" | "fire_security" => SiteProfile::FireSecurity,
            _ => SiteProfile::Logistics,
        }
    }

    pub fn specs(self) -> Vec<SectionSpec> {
        match self {
            SiteProfile::Logistics => vec![
                SectionSpec::new("Home", "#home"),
                SectionSpec::new("Services", "#services"),
                SectionSpec::new("About Us", "#about-us"),
                SectionSpec::new("Contact", "#contact"),
            ],
            SiteProfile::FireSecurity => vec![
                SectionSpec::new("Home", "#home"),
                SectionSpec::new("Services", "#services"),
                SectionSpec::new("About", "#about"),
                SectionSpec::new("Deals", "#deals"),
                SectionSpec::new("Contact", "#contact"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistics_profile_order_and_anchors() {
        let reg = SectionRegistry::from_profile(SiteProfile::Logistics);
        let names: Vec<&str> = reg.iter().map(|id| reg.name(id)).collect();
        assert_eq!(names, ["Home", "Services", "About Us", "Contact"]);
        let about = reg.lookup("About Us").unwrap();
        assert_eq!(reg.anchor(about), "#about-us");
        assert_eq!(reg.by_anchor("#contact"), reg.lookup("Contact"));
        assert_eq!(reg.default_section(), reg.lookup("Home").unwrap());
    }

    #[test]
    fn test_profiles_pass_validation() {
        for profile in [SiteProfile::Logistics, SiteProfile::FireSecurity] {
            let reg = SectionRegistry::new(profile.specs()).unwrap();
            assert_eq!(reg.len(), profile.specs().len());
        }
    }

    #[test]
    fn test_primary_section_gets_lower_threshold() {
        let reg = SectionRegistry::from_profile(SiteProfile::Logistics);
        assert_eq!(reg.threshold(reg.lookup("Home").unwrap()), Threshold::PRIMARY);
        assert_eq!(reg.threshold(reg.lookup("Services").unwrap()), Threshold::DEFAULT);
    }

    #[test]
    fn test_profile_and_validated_registries_agree_on_thresholds() {
        for profile in [SiteProfile::Logistics, SiteProfile::FireSecurity] {
            let preset = SectionRegistry::from_profile(profile);
            let validated = SectionRegistry::new(profile.specs()).unwrap();
            let a: Vec<Threshold> = preset.iter().map(|id| preset.threshold(id)).collect();
            let b: Vec<Threshold> = validated.iter().map(|id| validated.threshold(id)).collect();
            assert_eq!(a, b);
            assert_eq!(a[0], Threshold::PRIMARY);
            assert!(a[1..].iter().all(|t| *t == Threshold::DEFAULT));
        }
    }

    #[test]
    fn test_explicit_threshold_overrides_default() {
        let reg = SectionRegistry::new(vec![
            SectionSpec::new("Home", "#home").with_threshold(0.9),
            SectionSpec::new("Deals", "#deals").with_threshold(0.3),
        ])
        .unwrap();
        assert_eq!(reg.threshold(reg.lookup("Home").unwrap()).value(), 0.9);
        assert_eq!(reg.threshold(reg.lookup("Deals").unwrap()).value(), 0.3);
    }

    #[test]
    fn test_ids_belong_to_their_registry() {
        let logistics = SectionRegistry::from_profile(SiteProfile::Logistics);
        let fire = SectionRegistry::from_profile(SiteProfile::FireSecurity);
        // Same position, different registry.
        let fire_home = fire.lookup("Home").unwrap();
        let fire_contact = fire.lookup("Contact").unwrap();
        assert_eq!(fire_home.index(), logistics.default_section().index());
        assert!(!logistics.contains(fire_home));
        assert!(!logistics.contains(fire_contact));
        assert!(fire.contains(fire_contact));
        // Clones share ids.
        let copy = logistics.clone();
        assert!(copy.contains(logistics.default_section()));
    }

    #[test]
    #[should_panic(expected = "minted by another registry")]
    fn test_foreign_id_panics_on_lookup_by_id() {
        let logistics = SectionRegistry::from_profile(SiteProfile::Logistics);
        let fire = SectionRegistry::from_profile(SiteProfile::FireSecurity);
        logistics.anchor(fire.lookup("Deals").unwrap());
    }

    #[test]
    fn test_unknown_name_has_no_id() {
        let reg = SectionRegistry::from_profile(SiteProfile::Logistics);
        assert!(reg.lookup("About").is_none());
        assert!(reg.lookup("contact").is_none());
    }

    #[test]
    fn test_rejects_invalid_registries() {
        assert_eq!(SectionRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
        assert_eq!(
            SectionRegistry::new(vec![
                SectionSpec::new("Home", "#home"),
                SectionSpec::new("Home", "#home-2"),
            ])
            .unwrap_err(),
            RegistryError::DuplicateName("Home".to_string())
        );
        assert_eq!(
            SectionRegistry::new(vec![
                SectionSpec::new("Home", "#home"),
                SectionSpec::new("Start", "#home"),
            ])
            .unwrap_err(),
            RegistryError::DuplicateAnchor("#home".to_string())
        );
        for bad in ["home", "#", "# home"] {
            assert!(matches!(
                SectionRegistry::new(vec![SectionSpec::new("Home", bad)]),
                Err(RegistryError::InvalidAnchor(_))
            ));
        }
        assert!(matches!(
            SectionRegistry::new(vec![SectionSpec::new("Home", "#home").with_threshold(1.5)]),
            Err(RegistryError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let reg = SectionRegistry::from_json(
            r##"[{"name":"Home","anchor":"#home"},{"name":"Deals","anchor":"#deals","threshold":0.6}]"##,
        )
        .unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.threshold(reg.lookup("Deals").unwrap()).value(), 0.6);
        assert!(SectionRegistry::from_json("[]").is_err());
    }
}

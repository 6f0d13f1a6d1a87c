//! Free-text specialty lookup.
//!
//! Two-tier resolution from one entry point:
//! 1. exact, case-insensitive match against the canonical enumeration
//!    (exact-set semantics);
//! 2. otherwise a case-insensitive substring match against each staff
//!    member's specialty text (keyword semantics).
//!
//! The tier that produced a result is not observable by callers.
//! Confirm the two-tier behavior with the administrative office before
//! collapsing it into one.

use crate::model::staff::{Specialty, StaffRecord};
use crate::schedule::directory::StaffDirectory;
use log::debug;

pub struct SpecialtyMatcher<'a> {
    directory: &'a StaffDirectory,
}

impl<'a> SpecialtyMatcher<'a> {
    pub fn new(directory: &'a StaffDirectory) -> Self {
        Self { directory }
    }

    /// First tier only: resolves `text` to a canonical specialty.
    pub fn resolve(text: &str) -> Option<Specialty> {
        Specialty::parse(text)
    }

    /// Staff whose specialty matches `text` (see module docs).
    pub fn matching(&self, text: &str) -> Vec<StaffRecord> {
        if let Some(specialty) = Self::resolve(text) {
            let matches = self
                .directory
                .select(|slot| slot.specialty == Some(specialty));
            debug!(
                "event=specialty_match module=schedule status=ok tier=exact specialty={} matches={}",
                specialty.as_str(),
                matches.len()
            );
            return matches;
        }

        let needle = text.trim().to_lowercase();
        let matches = self.directory.select(|slot| {
            slot.specialty
                .is_some_and(|specialty| specialty.as_str().to_lowercase().contains(&needle))
        });
        debug!(
            "event=specialty_match module=schedule status=ok tier=keyword matches={}",
            matches.len()
        );
        matches
    }
}

//! Group membership discovered for each directory.
//!
//! Directory settings are immutable once built. The groups found while
//! authorizing a request are kept here instead, keyed by directory name.

use std::collections::BTreeSet;

use dashmap::DashMap;

use crate::ldap::Named;

/// Groups available per directory, shared between authorization checks.
#[derive(Debug, Default)]
pub struct AvailableGroups {
    groups: DashMap<String, BTreeSet<String>>,
}

impl AvailableGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the groups recorded for a directory.
    ///
    /// Empty until [`AvailableGroups::set`] is called for it.
    pub fn get<N>(&self, directory: &N) -> BTreeSet<String>
    where
        N: Named + ?Sized,
    {
        self.groups
            .get(directory.name())
            .map(|groups| groups.value().clone())
            .unwrap_or_default()
    }

    /// Replace the groups recorded for a directory.
    pub fn set<N, I>(&self, directory: &N, groups: I)
    where
        N: Named + ?Sized,
        I: IntoIterator<Item = String>,
    {
        self.groups
            .insert(directory.name().to_owned(), groups.into_iter().collect());
    }

    /// Forget the groups of a directory, e.g. after a reload.
    pub fn clear<N>(&self, directory: &N)
    where
        N: Named + ?Sized,
    {
        self.groups.remove(directory.name());
    }
}

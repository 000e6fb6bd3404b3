//! Organisation snapshot store.
//!
//! Snapshots are replaced whole, never patched field by field, so a reader
//! always sees laws, proposals and roles from the same fetch.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use lawbook::{Address, Organisation};

/// Concurrent store of the latest snapshot per organisation.
pub struct OrganisationStore {
    snapshots: DashMap<Address, Arc<Organisation>>,
}

impl OrganisationStore {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    /// Swap in a freshly fetched snapshot. Returns the one it replaced.
    pub fn replace(&self, organisation: Organisation) -> Option<Arc<Organisation>> {
        let address = organisation.address;
        info!(
            organisation = %address,
            laws = organisation.laws.len(),
            active_laws = organisation.active_laws.len(),
            proposals = organisation.proposals.len(),
            "Replacing organisation snapshot"
        );
        self.snapshots.insert(address, Arc::new(organisation))
    }

    /// Current snapshot. Later replacements do not affect the returned value.
    pub fn get(&self, address: &Address) -> Option<Arc<Organisation>> {
        self.snapshots.get(address).map(|s| Arc::clone(s.value()))
    }

    pub fn remove(&self, address: &Address) -> Option<Arc<Organisation>> {
        self.snapshots.remove(address).map(|(_, snapshot)| snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for OrganisationStore {
    fn default() -> Self {
        Self::new()
    }
}

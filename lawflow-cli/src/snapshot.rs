//! Snapshot file read by the CLI.
//!
//! Bundles what the fetch layer would otherwise supply piecemeal: the
//! organisation, its completed executions, and who holds which role.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use lawbook::{Address, ExecutionIndex, ExecutionRecord, InMemoryChain, Organisation, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    pub organisation: Organisation,
    #[serde(default)]
    pub executions: Vec<ExecutionRecord>,
    #[serde(default)]
    pub role_holders: HashMap<Address, Vec<Role>>,
}

impl SnapshotFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let mut snapshot: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        if snapshot.organisation.roles.is_empty() {
            snapshot.organisation.roles = Organisation::derive_roles(&snapshot.organisation.active_laws);
        }
        Ok(snapshot)
    }

    pub fn execution_index(&self) -> ExecutionIndex {
        ExecutionIndex::from_records(self.executions.iter().cloned())
    }

    /// Chain view answering authorization queries from `role_holders`.
    pub async fn chain(&self) -> InMemoryChain {
        let chain = InMemoryChain::new();
        chain.register_laws(&self.organisation.laws).await;
        chain.register_laws(&self.organisation.active_laws).await;
        for (account, roles) in &self.role_holders {
            for role in roles {
                chain.assign_role(*account, *role).await;
            }
        }
        chain
    }
}

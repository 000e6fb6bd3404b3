//! Per-law index of completed executions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, MatchPolicy};
use crate::address::Address;
use crate::types::ExecutionRecord;

/// Execution records grouped by law, newest first.
///
/// Records with equal block numbers keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionIndex {
    by_law: HashMap<Address, Vec<ExecutionRecord>>,
}

impl ExecutionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ExecutionRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert a record, keeping the law's list sorted by block descending.
    pub fn insert(&mut self, record: ExecutionRecord) {
        let records = self.by_law.entry(record.law).or_default();
        // After every existing record at the same or a higher block
        let pos = records.partition_point(|r| r.block_number >= record.block_number);
        records.insert(pos, record);
    }

    /// Replace all records for `law` with `records`.
    pub fn set_law(&mut self, law: Address, records: Vec<ExecutionRecord>) {
        self.by_law.remove(&law);
        for record in records.into_iter().filter(|r| r.law == law) {
            self.insert(record);
        }
    }

    pub fn for_law(&self, law: &Address) -> &[ExecutionRecord] {
        self.by_law.get(law).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent execution of `law`.
    pub fn latest(&self, law: &Address) -> Option<&ExecutionRecord> {
        self.for_law(law).first()
    }

    /// Most recent execution of `law` that ran the same calldata and description as `action`.
    pub fn find_matching(
        &self,
        law: &Address,
        action: &Action,
        policy: MatchPolicy,
    ) -> Option<&ExecutionRecord> {
        self.for_law(law)
            .iter()
            .find(|record| record.action().same_payload(action, policy))
    }

    pub fn len(&self) -> usize {
        self.by_law.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_law.values().all(Vec::is_empty)
    }
}

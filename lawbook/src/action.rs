//! Action identity.
//!
//! An action is the triple `(law, calldata, description)`. Proposals and
//! execution records are matched against it through a content hash, so the
//! same rule applies everywhere a "same action" question is asked.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::{Address, Calldata};

/// How descriptions are compared when matching actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Bit-exact triple, as the protocol itself compares
    #[default]
    Exact,
    /// Trim and collapse whitespace runs in descriptions before comparing
    NormalizedDescription,
}

/// A request to execute `law` with `calldata`, labelled by `description`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub law: Address,
    pub calldata: Calldata,
    pub description: String,
}

impl Action {
    pub fn new(law: Address, calldata: Calldata, description: impl Into<String>) -> Self {
        Self {
            law,
            calldata,
            description: description.into(),
        }
    }

    /// Exact content id.
    pub fn id(&self) -> ActionId {
        self.id_with(MatchPolicy::Exact)
    }

    pub fn id_with(&self, policy: MatchPolicy) -> ActionId {
        match policy {
            MatchPolicy::Exact => ActionId::compute(&self.law, &self.calldata, &self.description),
            MatchPolicy::NormalizedDescription => ActionId::compute(
                &self.law,
                &self.calldata,
                &normalize_description(&self.description),
            ),
        }
    }

    /// Same action under `policy`, ignoring which law it targets.
    ///
    /// Used to ask whether a *dependency* law ran the same payload.
    pub fn same_payload(&self, other: &Action, policy: MatchPolicy) -> bool {
        let retargeted = Action::new(self.law, other.calldata.clone(), other.description.clone());
        self.id_with(policy) == retargeted.id_with(policy)
    }
}

/// SHA-256 content id of an action triple, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    pub fn compute(law: &Address, calldata: &Calldata, description: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(law.as_bytes());
        // Length prefix keeps calldata and description from bleeding into each other
        hasher.update((calldata.len() as u64).to_be_bytes());
        hasher.update(calldata.as_bytes());
        hasher.update(description.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim and collapse inner whitespace runs to a single space.
pub fn normalize_description(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

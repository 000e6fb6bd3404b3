//! Core types for the governance snapshot.
//!
//! These mirror what the fetch layer reads from chain: laws and their
//! configuration, proposals, and completed executions. The snapshot is a
//! point-in-time value; nothing here mutates chain state.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for the presentation layer.

use std::collections::BTreeSet;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::action::Action;
use crate::address::{Address, Calldata};
use crate::roles::Role;

/// Reference from one law to another.
///
/// The zero address on the wire becomes [`Dependency::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Address", into = "Address")]
pub enum Dependency {
    #[default]
    None,
    On(Address),
}

impl Dependency {
    pub fn target(&self) -> Option<Address> {
        match self {
            Self::None => None,
            Self::On(addr) => Some(*addr),
        }
    }

    /// Whether this dependency points at `law`. `None` never matches.
    pub fn points_at(&self, law: &Address) -> bool {
        matches!(self, Self::On(addr) if addr == law)
    }
}

impl From<Address> for Dependency {
    fn from(addr: Address) -> Self {
        if addr.is_zero() {
            Self::None
        } else {
            Self::On(addr)
        }
    }
}

impl From<Option<Address>> for Dependency {
    fn from(addr: Option<Address>) -> Self {
        addr.map(Self::from).unwrap_or_default()
    }
}

impl From<Dependency> for Address {
    fn from(dep: Dependency) -> Self {
        dep.target().unwrap_or(Address::ZERO)
    }
}

/// Execution and voting configuration of a law.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct LawConfig {
    /// Blocks that must pass after vote end before execution (0 = none)
    pub delay_execution: u64,
    /// Minimum blocks between executions of this law (0 = unthrottled)
    pub throttle_execution: u64,
    /// 0 means no vote is required
    pub quorum: u64,
    pub succeed_at: u64,
    pub voting_period: u64,
    /// Law that must have completed the same action
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub need_completed: Dependency,
    /// Law that must not have completed the same action
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub need_not_completed: Dependency,
    /// Law whose state this law reads; structural only
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub read_state_from: Dependency,
}

impl LawConfig {
    pub fn requires_vote(&self) -> bool {
        self.quorum != 0
    }
}

/// A programmable rule contract gating an executive action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Law {
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub law: Address,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub allowed_role: Role,
    #[serde(default)]
    pub config: LawConfig,
}

impl Law {
    /// Set dependency targets, in field order, without duplicates.
    pub fn dependencies(&self) -> Vec<Address> {
        let mut deps = Vec::with_capacity(3);
        for dep in [
            self.config.need_completed,
            self.config.need_not_completed,
            self.config.read_state_from,
        ] {
            if let Some(addr) = dep.target() {
                if !deps.contains(&addr) {
                    deps.push(addr);
                }
            }
        }
        deps
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies().is_empty()
    }

    /// Whether any of this law's dependency fields points at `other`.
    pub fn depends_on(&self, other: &Address) -> bool {
        self.config.need_completed.points_at(other)
            || self.config.need_not_completed.points_at(other)
            || self.config.read_state_from.points_at(other)
    }
}

/// Lifecycle state of a proposal, with the protocol's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProposalState {
    Active = 0,
    Cancelled = 1,
    Defeated = 2,
    Succeeded = 3,
    Executed = 4,
    NonExistent = 5,
}

impl ProposalState {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Cancelled),
            2 => Some(Self::Defeated),
            3 => Some(Self::Succeeded),
            4 => Some(Self::Executed),
            5 => Some(Self::NonExistent),
            _ => None,
        }
    }

    /// Succeeded or Executed.
    pub fn has_passed(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Executed)
    }
}

impl TryFrom<u8> for ProposalState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown proposal state {}", code))
    }
}

impl From<ProposalState> for u8 {
    fn from(state: ProposalState) -> Self {
        state.code()
    }
}

/// A votable request to execute a law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// uint256 id as a decimal string
    pub proposal_id: String,
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub target_law: Address,
    pub vote_start: u64,
    pub vote_end: u64,
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub execute_calldata: Calldata,
    pub description: String,
    #[serde(default)]
    pub for_votes: u128,
    #[serde(default)]
    pub against_votes: u128,
    #[serde(default)]
    pub abstain_votes: u128,
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub state: ProposalState,
}

impl Proposal {
    /// The identity triple of the action this proposal would execute.
    pub fn action(&self) -> Action {
        Action::new(
            self.target_law,
            self.execute_calldata.clone(),
            self.description.clone(),
        )
    }
}

/// A completed action, derived from a "proposal completed" log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub law: Address,
    #[cfg_attr(feature = "typescript", ts(type = "string"))]
    pub calldata: Calldata,
    pub description: String,
    pub block_number: u64,
}

impl ExecutionRecord {
    pub fn action(&self) -> Action {
        Action::new(self.law, self.calldata.clone(), self.description.clone())
    }
}

/// Point-in-time snapshot of one organisation's governance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub address: Address,
    #[serde(default)]
    pub name: String,
    /// Every law ever initialized
    #[serde(default)]
    pub laws: Vec<Law>,
    /// Currently enabled subset of `laws`
    #[serde(default)]
    pub active_laws: Vec<Law>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Organisation {
    pub fn new(
        address: Address,
        name: impl Into<String>,
        laws: Vec<Law>,
        active_laws: Vec<Law>,
        proposals: Vec<Proposal>,
    ) -> Self {
        let roles = Self::derive_roles(&active_laws);
        Self {
            address,
            name: name.into(),
            laws,
            active_laws,
            proposals,
            roles,
        }
    }

    /// Distinct `allowedRole` values across active laws, ordered by role id.
    pub fn derive_roles(active_laws: &[Law]) -> Vec<Role> {
        let ids: BTreeSet<u64> = active_laws.iter().map(|l| l.allowed_role.id()).collect();
        ids.into_iter().map(Role::from).collect()
    }

    /// Load a snapshot as produced by the fetch layer. Missing roles are derived.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut org: Self = serde_json::from_str(json)?;
        if org.roles.is_empty() {
            org.roles = Self::derive_roles(&org.active_laws);
        }
        Ok(org)
    }

    pub fn active_law(&self, law: &Address) -> Option<&Law> {
        self.active_laws.iter().find(|l| &l.law == law)
    }

    pub fn law(&self, law: &Address) -> Option<&Law> {
        self.laws.iter().find(|l| &l.law == law)
    }
}

/// Outcome of evaluating whether an action may execute now.
///
/// Every field defaults to `true` when the law's configuration makes the
/// check not applicable. Serialized with an extra `allPassed` verdict, which
/// is ignored on the way back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Checks {
    pub authorised: bool,
    pub proposal_exists: bool,
    pub proposal_passed: bool,
    pub proposal_not_completed: bool,
    pub law_completed: bool,
    pub law_not_completed: bool,
    pub delay_passed: bool,
    pub throttle_passed: bool,
}

impl Checks {
    /// All checks passing.
    pub fn passing() -> Self {
        Self {
            authorised: true,
            proposal_exists: true,
            proposal_passed: true,
            proposal_not_completed: true,
            law_completed: true,
            law_not_completed: true,
            delay_passed: true,
            throttle_passed: true,
        }
    }

    fn fields(&self) -> [(&'static str, bool); 8] {
        [
            ("authorised", self.authorised),
            ("proposalExists", self.proposal_exists),
            ("proposalPassed", self.proposal_passed),
            ("proposalNotCompleted", self.proposal_not_completed),
            ("lawCompleted", self.law_completed),
            ("lawNotCompleted", self.law_not_completed),
            ("delayPassed", self.delay_passed),
            ("throttlePassed", self.throttle_passed),
        ]
    }

    pub fn all_passed(&self) -> bool {
        self.fields().iter().all(|(_, passed)| *passed)
    }

    /// Names of failed checks, in declaration order.
    pub fn failing(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Serialize for Checks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Checks", 9)?;
        for (name, passed) in self.fields() {
            state.serialize_field(name, &passed)?;
        }
        state.serialize_field("allPassed", &self.all_passed())?;
        state.end()
    }
}

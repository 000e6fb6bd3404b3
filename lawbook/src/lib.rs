//! Typed governance snapshot for role-restricted on-chain governance.
//!
//! Laws are programmable rule contracts gating executive actions. Each law is
//! restricted to a role, may require a vote, and may depend on other laws
//! having (or not having) completed the same action.
//!
//! # Key Components
//!
//! - [`Law`], [`LawConfig`], [`Proposal`], [`ExecutionRecord`]: the snapshot values
//! - [`Dependency`] and [`Role`]: tagged unions replacing the zero-address and
//!   role-id sentinels
//! - [`Action`] / [`ActionId`]: the `(law, calldata, description)` identity triple
//! - [`ExecutionIndex`]: executions per law, newest first
//! - [`AuthorityOracle`] / [`ExecutionLog`]: read-only chain collaborators
//! - [`Checks`]: outcome record of a precondition evaluation
//!
//! # Example
//!
//! ```ignore
//! use lawbook::{Organisation, ExecutionIndex};
//!
//! let org = Organisation::from_json(&snapshot_json)?;
//! let index = ExecutionIndex::from_records(records);
//! let latest = index.latest(&org.active_laws[0].law);
//! ```

pub mod action;
pub mod address;
pub mod executions;
pub mod oracle;
pub mod roles;
pub mod types;

// Re-export main types
pub use action::{normalize_description, Action, ActionId, MatchPolicy};
pub use address::{Address, AddressError, Calldata};
pub use executions::ExecutionIndex;
pub use oracle::{AuthorityOracle, ExecutionLog, InMemoryChain, ReadError};
pub use roles::{PaletteError, Role, RoleDisplay, RolePalette, ADMIN_ROLE_ID, PUBLIC_ROLE_ID};
pub use types::*;

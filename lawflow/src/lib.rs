//! Lawflow - execution preconditions and dependency tracks for governance clients
//!
//! Works purely on a snapshot of an organisation's governance state:
//!
//! - **Precondition checks**: whether an action (law + calldata + description)
//!   may execute now, mirroring the on-chain gate
//! - **Dependency tracks**: how active laws chain together, start to end
//! - **Fenced sessions**: only the newest evaluation result is published
//! - **Snapshot store**: whole-snapshot swaps per organisation
//!
//! # Example
//!
//! ```ignore
//! use lawflow::{DependencyGraphBuilder, EvaluationInput, PreconditionChecker};
//!
//! let checks = PreconditionChecker::new()
//!     .evaluate(&oracle, &input, &executions)
//!     .await?;
//! let flow = DependencyGraphBuilder::new().build(&org.active_laws)?;
//! ```

pub mod checker;
pub mod config;
pub mod graph;
pub mod session;
pub mod store;
pub mod types;

// Re-export main types
pub use checker::{compute_checks, matching_proposal, EvaluationInput, PreconditionChecker};
pub use config::{BlockDomain, CheckerConfig, EngineConfig, GraphConfig, RoleEntry};
pub use graph::{DependencyGraphBuilder, Flow, Partition};
pub use session::{EvaluationSession, EvaluationStatus, RequestToken};
pub use store::OrganisationStore;
pub use types::{LawflowError, Result};

//! Configuration for the lawflow engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lawbook::{MatchPolicy, Role, RoleDisplay, RolePalette};

use crate::types::{LawflowError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Precondition checker configuration
    #[serde(default)]
    pub checker: CheckerConfig,
    /// Dependency graph configuration
    #[serde(default)]
    pub graph: GraphConfig,
    /// Which block counter delay and throttle windows are measured in
    #[serde(default)]
    pub block_domain: BlockDomain,
    /// Role display entries
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
}

impl EngineConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load a YAML config file and validate its role palette.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LawflowError::Config(format!("reading {}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&raw)
            .map_err(|e| LawflowError::Config(format!("parsing {}: {}", path.display(), e)))?;
        config.role_palette()?;
        Ok(config)
    }

    /// Validated role palette built from `roles`.
    pub fn role_palette(&self) -> Result<RolePalette> {
        let entries = self
            .roles
            .iter()
            .map(|e| (Role::from(e.id), RoleDisplay::new(e.label.clone(), e.color.clone())));
        Ok(RolePalette::new(entries)?)
    }
}

/// Precondition checker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// How proposals and executions are matched to the requested action
    pub match_policy: MatchPolicy,
    /// Issue independent reads concurrently
    pub batch_reads: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::Exact,
            batch_reads: true,
        }
    }
}

/// Dependency graph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Fail on dependency cycles instead of dropping the laws involved
    pub reject_cycles: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            reject_cycles: true,
        }
    }
}

/// Block counter the protocol references.
///
/// On some L2 deployments the protocol reads the L1 block number, so the
/// `current_block` passed to evaluations must come from that chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlockDomain {
    /// Block number of the connected chain
    #[default]
    Native,
    /// Block number of the given L1 chain
    L1 { chain_id: u64 },
}

/// One role display entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Raw role id
    pub id: u64,
    pub label: String,
    pub color: String,
}

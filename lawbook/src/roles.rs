//! Roles and their display attributes.
//!
//! On chain a role is a plain integer with two reserved values. Here the
//! reserved values are variants, and display attributes come from an explicit
//! palette instead of positional lookup tables.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Raw role id reserved for the admin role.
pub const ADMIN_ROLE_ID: u64 = 0;
/// Raw role id reserved for the public role (`2^32 - 1`).
pub const PUBLIC_ROLE_ID: u64 = 4_294_967_295;

/// Permission class allowed to call a law.
///
/// Equality, hashing and ordering go through [`Role::id`], so
/// `Numbered(0)` is the same role as `Admin` wherever roles are compared or
/// used as keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum Role {
    /// Role id 0
    Admin,
    /// Role id 2^32 - 1: anyone may call
    Public,
    /// Any other role id
    Numbered(u64),
}

impl Role {
    /// The raw on-chain id, sentinels preserved bit-exactly.
    pub fn id(&self) -> u64 {
        match self {
            Self::Admin => ADMIN_ROLE_ID,
            Self::Public => PUBLIC_ROLE_ID,
            Self::Numbered(n) => *n,
        }
    }

    pub fn is_public(&self) -> bool {
        self.id() == PUBLIC_ROLE_ID
    }

    /// Same role with reserved ids mapped to their named variants.
    pub fn canonical(self) -> Self {
        Self::from(self.id())
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl From<u64> for Role {
    fn from(id: u64) -> Self {
        match id {
            ADMIN_ROLE_ID => Self::Admin,
            PUBLIC_ROLE_ID => Self::Public,
            n => Self::Numbered(n),
        }
    }
}

impl From<Role> for u64 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            Self::Admin => write!(f, "Admin"),
            Self::Public => write!(f, "Public"),
            Self::Numbered(n) => write!(f, "Role {}", n),
        }
    }
}

/// Errors building a [`RolePalette`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    #[error("Invalid color for {role}: {color} (expected #rrggbb)")]
    InvalidColor { role: Role, color: String },

    #[error("Empty label for {0}")]
    EmptyLabel(Role),

    #[error("Role listed more than once: {0}")]
    DuplicateRole(Role),
}

/// How a role is shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDisplay {
    pub label: String,
    /// `#rrggbb`
    pub color: String,
}

impl RoleDisplay {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

const FALLBACK_COLOR: &str = "#94a3b8";

/// Validated mapping from role to display attributes.
#[derive(Debug, Clone)]
pub struct RolePalette {
    entries: HashMap<Role, RoleDisplay>,
}

impl RolePalette {
    /// Build a palette from explicit entries, on top of the Admin/Public defaults.
    pub fn new(
        entries: impl IntoIterator<Item = (Role, RoleDisplay)>,
    ) -> Result<Self, PaletteError> {
        let mut palette = Self::default();
        let mut seen = Vec::new();

        for (role, display) in entries {
            if seen.contains(&role) {
                return Err(PaletteError::DuplicateRole(role));
            }
            if display.label.trim().is_empty() {
                return Err(PaletteError::EmptyLabel(role));
            }
            if !is_hex_color(&display.color) {
                return Err(PaletteError::InvalidColor {
                    role,
                    color: display.color,
                });
            }
            seen.push(role.canonical());
            palette.entries.insert(role.canonical(), display);
        }

        Ok(palette)
    }

    /// Display attributes for a role. Unconfigured roles get a generated label.
    pub fn display(&self, role: Role) -> RoleDisplay {
        self.entries
            .get(&role)
            .cloned()
            .unwrap_or_else(|| RoleDisplay::new(role.to_string(), FALLBACK_COLOR))
    }

}

impl Default for RolePalette {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(Role::Admin, RoleDisplay::new("Admin", "#1e293b"));
        entries.insert(Role::Public, RoleDisplay::new("Public", "#16a34a"));
        Self { entries }
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

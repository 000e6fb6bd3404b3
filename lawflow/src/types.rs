//! Shared error type for the lawflow engine.

use lawbook::{Address, PaletteError, ReadError};

/// Errors from lawflow operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LawflowError {
    /// A collaborator read failed; the evaluation was aborted
    #[error("Read failed: {0}")]
    Read(#[from] ReadError),

    /// Active laws depend on each other in a loop
    #[error("Dependency cycle: {}", format_path(.path))]
    DependencyCycle { path: Vec<Address> },

    /// Role palette entries did not validate
    #[error("Role palette error: {0}")]
    Palette(#[from] PaletteError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_path(path: &[Address]) -> String {
    path.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, LawflowError>;

//! Error types for catalog loading and building.
//!
//! Covers I/O, serialization, and declarations rejected by the core
//! [`CommandSet`](command_params_core::CommandSet).

use command_params_core::DeclarationError;
use thiserror::Error;

/// Errors that can occur while loading or building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Catalog file extension is neither JSON nor YAML.
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    /// Structural problem in the catalog itself (e.g., empty version).
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A command names a parent that is not declared before it.
    #[error("command {command}: unknown parent {parent}")]
    UnknownParent { command: String, parent: String },

    /// The core rejected a command or parameter declaration.
    #[error("command {command}: {source}")]
    Declaration {
        command: String,
        #[source]
        source: DeclarationError,
    },
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;

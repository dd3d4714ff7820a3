//! Error types for a generation run.
//!
//! Every variant is terminal: the binary logs it once and exits.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for functypes operations
#[derive(Debug, Error)]
pub enum Error {
    /// A flag or configuration value that cannot be used
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// An explicitly requested configuration file could not be used
    #[error("config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The package directory could not be listed
    #[error("failed to read directory {}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The package directory holds no Go source files
    #[error("found no .go files in {}", path.display())]
    NoSourceFiles { path: PathBuf },

    /// The front-end could not produce type information for the package
    #[error("{}", load_message(path.as_deref(), message))]
    Load {
        message: String,
        path: Option<PathBuf>,
    },

    /// Two interfaces produce different declarations with the same name
    #[error("function type {name} is declared by both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// The output directory could not be created
    #[error("mkdir {} with perm {mode:o}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        mode: u32,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written
    #[error("write {} with perm {mode:o}", path.display())]
    FileWrite {
        path: PathBuf,
        mode: u32,
        #[source]
        source: std::io::Error,
    },
}

fn load_message(path: Option<&Path>, message: &str) -> String {
    match path {
        Some(path) => format!("{}: {}", path.display(), message),
        None => message.to_string(),
    }
}

impl Error {
    /// Create a load error without file context
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            path: None,
        }
    }

    /// Create a load error attributed to one source file
    pub fn load_in(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

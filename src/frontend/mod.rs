//! Go front-end over tree-sitter-go.
//!
//! - [`parser`]: tree-sitter setup and node helpers
//! - [`lower`]: CST to owned [`crate::core`] values
//! - [`loader`]: directory to [`crate::core::Package`]
//! - [`resolve`]: alias resolution and interface method sets
//! - [`constant`]: integer folding for array lengths
//! - [`build`]: build constraints and file-name platform suffixes

pub mod build;
pub mod constant;
pub mod loader;
pub mod lower;
pub mod parser;
pub mod resolve;

pub use build::BuildContext;
pub use loader::{is_package_source, load_package, load_package_with, package_sources};
pub use resolve::{Method, Resolution, Resolver};

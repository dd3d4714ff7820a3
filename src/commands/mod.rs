//! Command implementations.
//!
//! - **generate**: scan a package and write its function types

pub mod generate;

pub use generate::{build_document, generate, output_path, GenerateReport};

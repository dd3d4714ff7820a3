// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod formatter;
pub mod frontend;
pub mod io;
pub mod observability;
pub mod scanner;

// Re-export commonly used types
pub use crate::core::{
    InterfaceType, MethodSignature, OutputDocument, Package, Param, Scope, Signature, TypeExpr,
};

pub use crate::commands::{build_document, generate, GenerateReport};
pub use crate::config::Config;
pub use crate::errors::{Error, Result};
pub use crate::formatter::{FormatOptions, SignatureFormatter};
pub use crate::frontend::load_package;
pub use crate::scanner::{scan_interfaces, ScannedInterface};

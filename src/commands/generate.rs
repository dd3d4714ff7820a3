//! The generation run: load, scan, format, write.

use crate::config::Config;
use crate::core::{OutputDocument, Package};
use crate::errors::{Error, Result};
use crate::formatter::{FormatOptions, SignatureFormatter};
use crate::frontend::load_package_with;
use crate::io::write_output;
use crate::scanner::scan_interfaces;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
    pub output_path: PathBuf,
    pub interfaces: usize,
    pub declarations: usize,
}

/// Scans `package` and renders the output document.
///
/// A declaration name produced by two interfaces is emitted once when both
/// render identically and rejected as a [`Error::NameCollision`] otherwise.
pub fn build_document(package: &Package, options: FormatOptions) -> Result<(OutputDocument, usize)> {
    let interfaces = scan_interfaces(package)?;
    let formatter = SignatureFormatter::new(package, options);

    let mut document = OutputDocument::new();
    let mut emitted: HashMap<&str, (&str, String)> = HashMap::new();

    for iface in &interfaces {
        for method in &iface.methods {
            let declaration = formatter.declaration(method);
            if let Some((first, existing)) = emitted.get(method.name.as_str()) {
                if *existing == declaration {
                    debug!(
                        "{} repeats {} from {}, emitting it once",
                        iface.name, method.name, first
                    );
                    continue;
                }
                return Err(Error::NameCollision {
                    name: method.name.clone(),
                    first: first.to_string(),
                    second: iface.name.clone(),
                });
            }

            info!("added: {}", declaration);
            emitted.insert(&method.name, (&iface.name, declaration.clone()));
            document.push(declaration);
        }
    }

    Ok((document, interfaces.len()))
}

/// `<out-dir>/<pkg-dir-basename>_functypes.go`
pub fn output_path(out_dir: &Path, package_dir: &Path, package_name: &str) -> PathBuf {
    let base = package_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| package_name.to_string());
    out_dir.join(format!("{}_functypes.go", base))
}

pub fn generate(config: &Config) -> Result<GenerateReport> {
    debug!("config: {:?}", config);

    // `.` and `..` have no usable basename until canonicalized.
    let package_dir = config
        .pkg_path
        .canonicalize()
        .map_err(|source| Error::DirectoryUnreadable {
            path: config.pkg_path.clone(),
            source,
        })?;

    let package = load_package_with(&package_dir, &config.build_context())?;
    debug!("package {} loaded from {} files", package.name, package.files.len());

    let (document, interfaces) = build_document(&package, config.format_options())?;

    let output_path = output_path(&config.out_dir, &package_dir, &package.name);
    debug!("output path: {}", output_path.display());
    write_output(&output_path, document.render().as_bytes())?;
    info!("saved {}", output_path.display());

    Ok(GenerateReport {
        output_path,
        interfaces,
        declarations: document.declarations().len(),
    })
}

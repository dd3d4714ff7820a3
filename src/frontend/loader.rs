//! Package loading: directory listing, anchor selection, parsing and scope
//! construction.

use super::build::BuildContext;
use super::lower::{lower_file, LoweredFile};
use super::parser::parse_source;
use crate::core::{Package, Scope};
use crate::errors::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Whether `name` is a Go file that belongs to a non-test build of the
/// package.
pub fn is_package_source(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Lists the package sources of `dir` in file-name order, leaving out files
/// whose names exclude them from `ctx`.
pub fn package_sources(dir: &Path, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let unreadable = |source: io::Error| Error::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| unreadable(e.into()))?;
        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(unreadable(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    "not a directory",
                )));
            }
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        debug!("{}", name);
        // Follows symlinks, like the go command.
        if !entry.path().is_file() || !is_package_source(&name) {
            continue;
        }
        if ctx.match_file_name(&name) {
            files.push(entry.path().to_path_buf());
        } else {
            debug!("{}: excluded by file name for {}/{}", name, ctx.goos, ctx.goarch);
        }
    }

    debug!("found {} source files in directory {}", files.len(), dir.display());
    Ok(files)
}

/// Loads the package held by `dir` for the host target.
pub fn load_package(dir: &Path) -> Result<Package> {
    load_package_with(dir, &BuildContext::from_env())
}

/// Loads the package held by `dir` for `ctx`.
///
/// The first file that takes part in the build anchors the package name;
/// every other such file must declare the same package.
pub fn load_package_with(dir: &Path, ctx: &BuildContext) -> Result<Package> {
    let mut files = Vec::new();
    let mut lowered = Vec::new();
    for path in package_sources(dir, ctx)? {
        if let Some(file) = load_file(&path, ctx)? {
            lowered.push(file);
            files.push(path);
        }
    }

    let mut lowered = lowered.into_iter();
    let anchor = lowered.next().ok_or_else(|| Error::NoSourceFiles {
        path: dir.to_path_buf(),
    })?;
    debug!("anchor file: {}", anchor.path.display());

    let mut scope = Scope::new();
    let name = anchor.package.clone();
    let anchor_path = anchor.path.clone();
    declare(&mut scope, anchor)?;

    for file in lowered {
        if file.package != name {
            return Err(Error::load(format!(
                "found packages {} ({}) and {} ({}) in {}",
                name,
                file_name(&anchor_path),
                file.package,
                file_name(&file.path),
                dir.display()
            )));
        }
        declare(&mut scope, file)?;
    }

    debug!("package {} scope: {:?}", name, scope.names().collect::<Vec<_>>());

    Ok(Package {
        name,
        dir: dir.to_path_buf(),
        files,
        scope,
    })
}

/// `None` when the file's build constraints exclude it.
fn load_file(path: &Path, ctx: &BuildContext) -> Result<Option<LoweredFile>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::load_in(path, format!("failed to read file: {}", e)))?;
    if !ctx.match_header(path, &content)? {
        debug!("{}: excluded by build constraints", path.display());
        return Ok(None);
    }
    let parsed = parse_source(&content, path)?;
    lower_file(path, &parsed).map(Some)
}

fn declare(scope: &mut Scope, file: LoweredFile) -> Result<()> {
    for object in file.objects {
        if let Err((object, existing)) = scope.insert(object) {
            return Err(Error::load(format!(
                "{}: {} redeclared in this block (other declaration of {} at {})",
                object.position, object.name, object.name, existing.position
            )));
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

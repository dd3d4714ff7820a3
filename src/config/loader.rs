use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::FileConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".functypes.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse config from a TOML string
pub fn parse_config(contents: &str) -> std::result::Result<FileConfig, String> {
    toml::from_str::<FileConfig>(contents).map_err(|e| e.to_string())
}

/// Loads an explicitly requested config file. Any failure is fatal.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let config = parse_config(&contents).map_err(|message| Error::Config {
        path: path.to_path_buf(),
        message,
    })?;
    debug!("Loaded config from {}", path.display());
    Ok(config.relative_to(parent_dir(path)))
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Searches `start` and its ancestors for `.functypes.toml`. Files that
/// exist but cannot be used are warned about and skipped.
pub fn discover_config(start: PathBuf) -> Option<FileConfig> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .or_else(|| {
            debug!(
                "No config found after checking {} directories. Using defaults.",
                MAX_TRAVERSAL_DEPTH
            );
            None
        })
}

fn try_load_config_from_path(path: &Path) -> Option<FileConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            // Only log actual errors, not "file not found"
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read config file {}: {}", path.display(), e);
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            Some(config.relative_to(parent_dir(path)))
        }
        Err(e) => {
            warn!("Failed to parse {}: {}. Ignoring it.", path.display(), e);
            None
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_accepts_known_keys() {
        let config = parse_config("out_dir = \"gen\"\nparam_names = true\n").unwrap();
        assert_eq!(config.out_dir, Some(PathBuf::from("gen")));
        assert_eq!(config.param_names, Some(true));
        assert_eq!(config.pkg_path, None);
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config("output = \"gen\"\n").unwrap_err();
        assert!(err.contains("output"), "{}", err);
    }

    #[test]
    fn test_directory_ancestors_respects_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]);
    }

    #[test]
    fn test_discover_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg/inner");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "out_dir = \"gen\"\n").unwrap();

        let config = discover_config(nested).unwrap();
        assert_eq!(config.out_dir, Some(temp.path().join("gen")));
    }

    #[test]
    fn test_discover_config_skips_invalid_file() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "not = [valid").unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "param_names = true\n").unwrap();

        let config = discover_config(nested).unwrap();
        assert_eq!(config.param_names, Some(true));
    }

    #[test]
    fn test_explicit_config_errors_are_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");

        let missing = load_config_file(&path).unwrap_err();
        assert!(matches!(missing, Error::Config { .. }));

        fs::write(&path, "param_names = \"yes\"").unwrap();
        let invalid = load_config_file(&path).unwrap_err();
        assert!(matches!(invalid, Error::Config { .. }));
    }
}

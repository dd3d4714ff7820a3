//! Run configuration.
//!
//! One immutable [`Config`] is built at startup from command-line flags
//! (which clap already merges with their environment variables), an
//! optional `.functypes.toml`, and the defaults, in that order of
//! precedence.

mod loader;

pub use loader::{
    directory_ancestors, discover_config, load_config_file, parse_config, CONFIG_FILE_NAME,
};

use crate::errors::{Error, Result};
use crate::formatter::FormatOptions;
use crate::frontend::BuildContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PKG_PATH: &str = ".";
pub const DEFAULT_OUT_DIR: &str = "./functypes/";

/// Settings a configuration file may carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub pkg_path: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub param_names: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl FileConfig {
    /// Resolves relative paths against `base`, the directory holding the
    /// file.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let rebase = |path: PathBuf| {
            if path.is_relative() && !path.as_os_str().is_empty() {
                base.join(path)
            } else {
                path
            }
        };
        self.pkg_path = self.pkg_path.map(rebase);
        self.out_dir = self.out_dir.map(rebase);
        self
    }
}

/// Values given on the command line or through the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub pkg_path: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub verbose: bool,
    pub param_names: bool,
    /// Empty when no `--tags` were given.
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Directory holding the package to scan.
    pub pkg_path: PathBuf,
    /// Directory the generated file is written to.
    pub out_dir: PathBuf,
    pub verbose: bool,
    pub param_names: bool,
    /// Extra build tags files are selected with.
    pub tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pkg_path: PathBuf::from(DEFAULT_PKG_PATH),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            verbose: false,
            param_names: false,
            tags: Vec::new(),
        }
    }
}

impl Config {
    pub fn resolve(overrides: ConfigOverrides, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Config::default();

        let pkg_path = overrides
            .pkg_path
            .or(file.pkg_path)
            .unwrap_or(defaults.pkg_path);
        let out_dir = overrides
            .out_dir
            .or(file.out_dir)
            .unwrap_or(defaults.out_dir);
        require_non_empty("--pkg-path", &pkg_path)?;
        require_non_empty("--out-dir", &out_dir)?;
        let tags = if overrides.tags.is_empty() {
            file.tags.unwrap_or_default()
        } else {
            overrides.tags
        };

        Ok(Self {
            pkg_path,
            out_dir,
            verbose: overrides.verbose,
            param_names: overrides.param_names || file.param_names.unwrap_or(false),
            tags,
        })
    }

    /// Host target from the environment, plus the configured tags.
    pub fn build_context(&self) -> BuildContext {
        let mut ctx = BuildContext::from_env();
        ctx.tags.extend(self.tags.iter().cloned());
        ctx
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            param_names: self.param_names,
        }
    }
}

fn require_non_empty(flag: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InputValidation(format!("{} must not be empty", flag)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_flags_or_file() {
        let config = Config::resolve(ConfigOverrides::default(), None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.out_dir, PathBuf::from("./functypes/"));
    }

    #[test]
    fn test_flags_win_over_file() {
        let overrides = ConfigOverrides {
            out_dir: Some(PathBuf::from("gen")),
            ..Default::default()
        };
        let file = FileConfig {
            pkg_path: Some(PathBuf::from("internal/store")),
            out_dir: Some(PathBuf::from("ignored")),
            param_names: Some(true),
            tags: Some(vec!["integration".to_string()]),
        };

        let config = Config::resolve(overrides, Some(file)).unwrap();
        assert_eq!(config.pkg_path, PathBuf::from("internal/store"));
        assert_eq!(config.out_dir, PathBuf::from("gen"));
        assert!(config.param_names);
        assert!(config.format_options().param_names);
        assert_eq!(config.tags, vec!["integration"]);
        assert!(config.build_context().match_tag("integration"));
    }

    #[test]
    fn test_tag_flags_replace_file_tags() {
        let overrides = ConfigOverrides {
            tags: vec!["e2e".to_string()],
            ..Default::default()
        };
        let file = FileConfig {
            tags: Some(vec!["integration".to_string()]),
            ..Default::default()
        };

        let config = Config::resolve(overrides, Some(file)).unwrap();
        assert_eq!(config.tags, vec!["e2e"]);
    }

    #[test]
    fn test_empty_path_is_input_validation_error() {
        let overrides = ConfigOverrides {
            pkg_path: Some(PathBuf::new()),
            ..Default::default()
        };
        let err = Config::resolve(overrides, None).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
        assert_eq!(err.to_string(), "invalid input: --pkg-path must not be empty");
    }

    #[test]
    fn test_file_paths_are_relative_to_file() {
        let file = FileConfig {
            pkg_path: Some(PathBuf::from("store")),
            out_dir: Some(PathBuf::from("/abs/out")),
            ..Default::default()
        }
        .relative_to(Path::new("/repo"));
        assert_eq!(file.pkg_path, Some(PathBuf::from("/repo/store")));
        assert_eq!(file.out_dir, Some(PathBuf::from("/abs/out")));
    }
}

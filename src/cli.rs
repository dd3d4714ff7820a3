use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "functypes")]
#[command(
    about = "Generate Go function types from the interface methods of a package",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Directory containing the Go package to scan [default: .]
    #[arg(long = "pkg-path", env = "FUNCTYPES_PKG_PATH")]
    pub pkg_path: Option<PathBuf>,

    /// Directory the generated file is written to [default: ./functypes/]
    #[arg(long = "out-dir", env = "FUNCTYPES_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Show debug log output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Keep parameter and result names in generated signatures
    #[arg(long = "param-names")]
    pub param_names: bool,

    /// Build tags to satisfy, comma-separated, as with `go build -tags`
    #[arg(long = "tags", env = "FUNCTYPES_TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Configuration file (defaults to the nearest .functypes.toml)
    #[arg(long = "config", env = "FUNCTYPES_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            pkg_path: self.pkg_path.clone(),
            out_dir: self.out_dir.clone(),
            verbose: self.verbose,
            param_names: self.param_names,
            tags: self.tags.clone(),
        }
    }
}

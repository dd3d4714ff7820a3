// Test utility module for functypes integration tests
#![allow(dead_code)]

use functypes::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A Go package laid out in a temporary directory.
pub struct GoPackageFixture {
    pub temp: TempDir,
    pub dir: PathBuf,
}

impl GoPackageFixture {
    /// Creates `<tmp>/<dir_name>/` holding no files yet.
    pub fn new(dir_name: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        Self { temp, dir }
    }

    pub fn with_file(self, name: &str, content: &str) -> Self {
        fs::write(self.dir.join(name), content).unwrap();
        self
    }

    pub fn out_dir(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    pub fn config(&self) -> Config {
        Config {
            pkg_path: self.dir.clone(),
            out_dir: self.out_dir(),
            ..Config::default()
        }
    }

    /// Path the generated file is expected at.
    pub fn output_file(&self) -> PathBuf {
        let base = self.dir.file_name().unwrap().to_string_lossy().into_owned();
        self.out_dir().join(format!("{}_functypes.go", base))
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Declaration lines of a generated document, header stripped.
pub fn declarations(document: &str) -> Vec<String> {
    let body = document
        .strip_prefix("package functypes\n\n")
        .expect("document starts with the package header");
    body.lines().map(str::to_string).collect()
}

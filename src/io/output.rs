//! Output writer for generated files.

use crate::errors::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Mode for created output directories (before umask).
pub const DIR_MODE: u32 = 0o750;

/// Mode for created output files (before umask).
pub const FILE_MODE: u32 = 0o666;

/// Creates the missing ancestors of `path`, then creates or truncates the
/// file and writes `content` to it.
pub fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }

    let write_err = |source| Error::FileWrite {
        path: path.to_path_buf(),
        mode: FILE_MODE,
        source,
    };
    let mut file = open_options().open(path).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        mode: DIR_MODE,
        source,
    })
}

fn open_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_ancestors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/c/out.go");

        write_output(&path, b"package functypes\n\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "package functypes\n\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.go");
        fs::write(&path, "a much longer previous content that must disappear").unwrap();

        write_output(&path, b"short").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_directory_create_error_when_parent_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_output(&blocker.join("out.go"), b"x").unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { mode: DIR_MODE, .. }), "{:?}", err);
    }

    #[test]
    fn test_file_write_error_when_target_is_a_directory() {
        let temp = TempDir::new().unwrap();
        let err = write_output(temp.path(), b"x").unwrap_err();
        assert!(matches!(err, Error::FileWrite { mode: FILE_MODE, .. }), "{:?}", err);
    }

    #[cfg(unix)]
    #[test]
    fn test_created_directory_has_no_world_access() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("generated");
        write_output(&dir.join("out.go"), b"x").unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o007, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_created_file_requests_read_write_for_everyone() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.go");
        write_output(&path, b"x").unwrap();

        // The process umask can only clear bits of the requested mode.
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !FILE_MODE, 0);
        assert_eq!(mode & 0o600, 0o600);
        assert_eq!(mode, FILE_MODE & !current_umask());
    }

    #[cfg(unix)]
    fn current_umask() -> u32 {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("umask");
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .mode(0o777)
            .open(&marker)
            .unwrap();
        0o777 & !fs::metadata(&marker).unwrap().permissions().mode()
    }
}

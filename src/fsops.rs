//! File system primitives used by the build pipeline.
//! Every function reports the path it failed on.

use crate::error::{BuildError, BuildResult};
use log::debug;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copies a file or directory tree from `source` to `target`.
///
/// Existing files at the target are overwritten; parent directories are
/// created as needed.
///
/// # Errors
/// * `BuildError::MissingPathError` if `source` does not exist
pub fn copy_any(source: &Path, target: &Path) -> BuildResult<()> {
    if !source.exists() {
        return Err(BuildError::MissingPathError {
            path: source.display().to_string(),
            context: "copy source".to_string(),
        });
    }

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source).unwrap_or(Path::new(""));
        let dest = if relative.as_os_str().is_empty() {
            target.to_path_buf()
        } else {
            target.join(relative)
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            copy_file(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Copies a single file, creating the parent directory of `dest`.
pub fn copy_file(source: &Path, dest: &Path) -> BuildResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    }
    debug!("Copying file: {}", dest.display());
    fs::copy(source, dest).map(|_| ()).map_err(BuildError::IoError)
}

/// Removes a file or directory. Absence is not an error.
///
/// # Returns
/// * `BuildResult<bool>` - Whether anything was removed
pub fn ensure_removed(path: &Path) -> BuildResult<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Renames `old` to `new`, replacing whatever already sits at `new`.
///
/// # Errors
/// * `BuildError::MissingPathError` if `old` does not exist
pub fn move_path(old: &Path, new: &Path) -> BuildResult<()> {
    if !old.exists() {
        return Err(BuildError::MissingPathError {
            path: old.display().to_string(),
            context: format!("rename to '{}'", new.display()),
        });
    }
    if old == new {
        return Ok(());
    }

    if let Some(parent) = new.parent() {
        fs::create_dir_all(parent)?;
    }
    ensure_removed(new)?;
    debug!("Moving {} -> {}", old.display(), new.display());
    fs::rename(old, new).map_err(BuildError::IoError)
}

/// Appends `suffix` to the file name of `path`.
pub fn with_appended_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_copy_any_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(source.join("pkg")).unwrap();
        fs::write(source.join("pkg/mod.py"), "x = 1\n").unwrap();

        let target = temp.path().join("out/src");
        copy_any(&source, &target).unwrap();
        assert_eq!(fs::read_to_string(target.join("pkg/mod.py")).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_copy_any_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_any(&temp.path().join("nope"), &temp.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_ensure_removed_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("inner")).unwrap();

        assert!(ensure_removed(&dir).unwrap());
        assert!(!ensure_removed(&dir).unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn test_move_path_replaces_target() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("a.txt");
        let new = temp.path().join("nested/b.txt");
        fs::write(&old, "new").unwrap();
        fs::create_dir_all(new.parent().unwrap()).unwrap();
        fs::write(&new, "stale").unwrap();

        move_path(&old, &new).unwrap();
        assert!(!old.exists());
        assert_eq!(fs::read_to_string(&new).unwrap(), "new");
    }

    #[test]
    fn test_with_appended_suffix() {
        assert_eq!(
            with_appended_suffix(Path::new("src/pkg/__init__.py"), ".jinja"),
            PathBuf::from("src/pkg/__init__.py.jinja")
        );
    }
}

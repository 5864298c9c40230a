//! Transient artifact patterns.
//! Paths matching these globs are litter produced by interpreters, the OS,
//! or the substitution step, and never belong in a finished template.

use crate::constants::TRANSIENT_PATTERNS;
use crate::error::BuildResult;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiles the default transient patterns plus any extra ones.
///
/// # Arguments
/// * `extra` - Manifest glob patterns, matched against paths relative to the template root
///
/// # Returns
/// * `BuildResult<GlobSet>` - Set of compiled glob patterns for path matching
pub fn transient_globset(extra: &[String]) -> BuildResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in TRANSIENT_PATTERNS {
        builder.add(Glob::new(pattern)?);
    }
    for pattern in extra {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Lists the topmost paths under `root` matching `globs`.
///
/// Matching directories are reported once; their contents are not visited.
pub fn find_transient(root: &Path, globs: &GlobSet) -> BuildResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if globs.is_match(relative) {
            debug!("Transient artifact: {}", relative.display());
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

/// Returns true if `path` (relative to the template root) is transient.
pub fn is_transient<P: AsRef<Path>>(globs: &GlobSet, path: P) -> bool {
    let path = path.as_ref();
    path.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| globs.is_match(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let globs = transient_globset(&[]).unwrap();
        assert!(globs.is_match("pyproject.toml.bak"));
        assert!(globs.is_match("src/pkg/__pycache__"));
        assert!(globs.is_match("src/pkg/mod.cpython-311.pyc"));
        assert!(globs.is_match(".DS_Store"));
        assert!(!globs.is_match("src/pkg/mod.py"));
    }

    #[test]
    fn test_is_transient_checks_ancestors() {
        let globs = transient_globset(&[]).unwrap();
        assert!(is_transient(&globs, "src/__pycache__/mod.py"));
        assert!(!is_transient(&globs, "src/pkg/mod.py"));
    }

    #[test]
    fn test_extra_patterns() {
        let globs = transient_globset(&["**/*.log".to_string()]).unwrap();
        assert!(globs.is_match("build/output.log"));
        assert!(globs.is_match("notes.bak"));
    }

    #[test]
    fn test_invalid_extra_pattern() {
        assert!(transient_globset(&["a[b".to_string()]).is_err());
    }
}

//! Up-to-date check for a freshly built template.
//! Compares the template directory against the git index of the repository
//! that contains it, the way `git diff --exit-code <dir>` would.

use crate::error::{BuildError, BuildResult};
use git2::{DiffOptions, Repository};
use log::{debug, info};
use std::path::Path;

/// Counts the tracked files under `template_root` that differ from the index.
///
/// Untracked files are ignored, matching `git diff`.
pub fn count_changes(template_root: &Path) -> BuildResult<usize> {
    let repo = Repository::discover(template_root)?;
    let workdir = repo.workdir().ok_or_else(|| {
        BuildError::ConfigError("cannot check a template inside a bare repository".to_string())
    })?;

    let template_root = template_root.canonicalize()?;
    let workdir = workdir.canonicalize()?;
    let pathspec = template_root.strip_prefix(&workdir).map_err(|_| {
        BuildError::ConfigError(format!(
            "template directory '{}' is outside repository '{}'",
            template_root.display(),
            workdir.display()
        ))
    })?;

    let mut opts = DiffOptions::new();
    if !pathspec.as_os_str().is_empty() {
        debug!("Diffing pathspec '{}'", pathspec.display());
        opts.pathspec(pathspec);
    }

    let diff = repo.diff_index_to_workdir(None, Some(&mut opts))?;
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
            info!("Changed: {} ({:?})", path.display(), delta.status());
        }
    }
    Ok(diff.deltas().len())
}

/// Fails if the template differs from what is committed.
///
/// # Errors
/// * `BuildError::CheckFailedError` if any tracked template file changed
pub fn ensure_up_to_date(template_root: &Path) -> BuildResult<()> {
    let changes = count_changes(template_root)?;
    if changes > 0 {
        return Err(BuildError::CheckFailedError {
            template_dir: template_root.display().to_string(),
            changes,
        });
    }
    info!("Check succeeded: template directory is up to date.");
    Ok(())
}

//! Template build pipeline.
//!
//! A build is a fixed sequence of file system steps over the template
//! directory: reset, copy, purge, templatize, substitute, structural rename,
//! overlay, cleanup and verify. Each step assumes the previous one succeeded
//! and the first error aborts the build.

use crate::config::Manifest;
use crate::constants::BACKUP_SUFFIX;
use crate::error::{BuildError, BuildResult};
use crate::fsops::{copy_any, copy_file, ensure_removed, move_path, with_appended_suffix};
use crate::ignore::{find_transient, is_transient, transient_globset};
use crate::keywords::Substitutor;
use crate::render::TemplateValidator;
use globset::GlobSet;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a completed build did, step by step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub preserved: usize,
    pub copied: usize,
    pub purged: usize,
    /// Template-relative paths of every marked file, suffix included
    pub templatized: Vec<PathBuf>,
    pub substituted: usize,
    pub renamed: usize,
    pub overlaid: usize,
    pub cleaned: usize,
    pub verified: usize,
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} copied, {} purged, {} templatized, {} rewritten, {} renamed, {} overlaid, {} cleaned",
            self.copied,
            self.purged,
            self.templatized.len(),
            self.substituted,
            self.renamed,
            self.overlaid,
            self.cleaned
        )
    }
}

/// Runs the pipeline for one manifest against one source directory.
pub struct Builder<'a> {
    manifest: &'a Manifest,
    validator: &'a dyn TemplateValidator,
    source_root: PathBuf,
    template_root: PathBuf,
    static_root: PathBuf,
    substitutor: Substitutor,
    transient: GlobSet,
    preserved: BTreeSet<PathBuf>,
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn read_text(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(|source| BuildError::FileError {
        path: path.display().to_string(),
        source,
    })
}

fn has_template_syntax(name: &str) -> bool {
    name.contains("{{") || name.contains("{%")
}

impl<'a> Builder<'a> {
    /// Creates a builder.
    ///
    /// # Arguments
    /// * `manifest` - Validated build manifest
    /// * `validator` - Parser used by the verify step
    /// * `source_root` - Directory holding the canonical source project
    /// * `template_dir` - Overrides the manifest's template directory; relative paths
    ///   are taken from `source_root` like the manifest's own
    pub fn new<P: AsRef<Path>>(
        manifest: &'a Manifest,
        validator: &'a dyn TemplateValidator,
        source_root: P,
        template_dir: Option<&Path>,
    ) -> BuildResult<Self> {
        let source_root = source_root.as_ref().to_path_buf();
        if !source_root.is_dir() {
            return Err(BuildError::MissingPathError {
                path: source_root.display().to_string(),
                context: "source directory".to_string(),
            });
        }

        let template_root =
            resolve(&source_root, template_dir.unwrap_or(manifest.template_dir.as_path()));
        let static_root = resolve(&source_root, &manifest.static_template_dir);

        Ok(Self {
            manifest,
            validator,
            source_root,
            template_root,
            static_root,
            substitutor: Substitutor::from_manifest(manifest)?,
            transient: transient_globset(&manifest.transient_patterns)?,
            preserved: manifest.preserve.iter().cloned().collect(),
        })
    }

    /// Directory the template is built into.
    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Runs every step in order.
    pub fn run(&self) -> BuildResult<BuildReport> {
        let mut report = BuildReport::default();

        info!("Cleaning up template directory {}", self.template_root.display());
        report.preserved = self.reset()?;

        info!(
            "Copying relevant files from {} to {}",
            self.source_root.display(),
            self.template_root.display()
        );
        report.copied = self.copy()?;
        report.purged = self.purge()?;

        report.templatized = self.templatize()?;
        report.substituted = self.substitute(&report.templatized)?;
        report.renamed = self.rename_structure()?;
        report.overlaid = self.overlay()?;
        report.cleaned = self.cleanup()?;
        report.verified = self.verify()?;

        info!("Build complete: {}", report);
        Ok(report)
    }

    /// Wipes the template directory, keeping the preserved control files.
    ///
    /// # Errors
    /// * `BuildError::MissingPreservedFileError` if an existing template lacks a preserved file
    /// * `BuildError::ConfigError` if the template directory contains the source directory
    pub fn reset(&self) -> BuildResult<usize> {
        let staging = tempfile::TempDir::new()?;
        let mut staged = Vec::new();

        if self.template_root.exists() {
            let template = self.template_root.canonicalize()?;
            if self.source_root.canonicalize()?.starts_with(&template) {
                return Err(BuildError::ConfigError(format!(
                    "template directory '{}' contains the source directory",
                    self.template_root.display()
                )));
            }

            for relative in &self.manifest.preserve {
                let path = self.template_root.join(relative);
                if !path.is_file() {
                    return Err(BuildError::MissingPreservedFileError {
                        path: relative.display().to_string(),
                        template_dir: self.template_root.display().to_string(),
                    });
                }
                debug!("Staging {}", relative.display());
                copy_file(&path, &staging.path().join(relative))?;
                staged.push(relative);
            }
            fs::remove_dir_all(&self.template_root)?;
        } else if !self.manifest.preserve.is_empty() {
            warn!(
                "{} does not exist yet; no control files to preserve",
                self.template_root.display()
            );
        }

        fs::create_dir_all(&self.template_root)?;
        for relative in &staged {
            copy_file(&staging.path().join(relative), &self.template_root.join(relative))?;
        }
        Ok(staged.len())
    }

    /// Copies every entry of the copy list into the template directory.
    pub fn copy(&self) -> BuildResult<usize> {
        let template = self.template_root.canonicalize()?;
        for relative in &self.manifest.include {
            let source = self.source_root.join(relative);
            if source.exists() && template.starts_with(source.canonicalize()?) {
                return Err(BuildError::ConfigError(format!(
                    "copy entry '{}' contains the template directory",
                    relative.display()
                )));
            }
            info!("Copying {}", relative.display());
            copy_any(&source, &self.template_root.join(relative))?;
        }
        Ok(self.manifest.include.len())
    }

    /// Removes every entry of the removal list, tolerating absence.
    pub fn purge(&self) -> BuildResult<usize> {
        let mut removed = 0;
        for relative in &self.manifest.exclude {
            if ensure_removed(&self.template_root.join(relative))? {
                info!("Removed {}", relative.display());
                removed += 1;
            } else {
                debug!("{} already absent", relative.display());
            }
        }
        Ok(removed)
    }

    /// Appends the marker suffix to the templatize list and, when discovery
    /// is on, to every other text file that needs rewriting.
    ///
    /// # Returns
    /// * `BuildResult<Vec<PathBuf>>` - Sorted template-relative paths of marked files
    ///
    /// # Errors
    /// * `BuildError::MissingPathError` if a listed file does not exist
    pub fn templatize(&self) -> BuildResult<Vec<PathBuf>> {
        let suffix = self.manifest.marker_suffix.as_str();
        let mut marked = BTreeSet::new();

        for relative in &self.manifest.templatize {
            let path = self.template_root.join(relative);
            if !path.is_file() {
                return Err(BuildError::MissingPathError {
                    path: path.display().to_string(),
                    context: "templatize list".to_string(),
                });
            }
            if relative.to_string_lossy().ends_with(suffix) {
                marked.insert(relative.clone());
                continue;
            }
            let target = with_appended_suffix(relative, suffix);
            move_path(&path, &self.template_root.join(&target))?;
            info!("Templatized {}", target.display());
            marked.insert(target);
        }

        if self.manifest.discover {
            for relative in self.discover()? {
                if relative.to_string_lossy().ends_with(suffix) {
                    debug!("{} is already a template", relative.display());
                    marked.insert(relative);
                    continue;
                }
                let target = with_appended_suffix(&relative, suffix);
                move_path(&self.template_root.join(&relative), &self.template_root.join(&target))?;
                info!("Templatized {} (discovered)", target.display());
                marked.insert(target);
            }
        }

        Ok(marked.into_iter().collect())
    }

    /// Lists text files needing a rewrite, including ones that already
    /// carry the marker suffix.
    fn discover(&self) -> BuildResult<Vec<PathBuf>> {
        let mut found = Vec::new();

        for entry in WalkDir::new(&self.template_root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.template_root).unwrap_or(entry.path());
            if self.preserved.contains(relative) || is_transient(&self.transient, relative) {
                continue;
            }
            // Binary files are never rewritten.
            let Ok(text) = fs::read_to_string(entry.path()) else {
                debug!("Skipping non-text file {}", relative.display());
                continue;
            };
            if self.substitutor.needs_rewrite(&text) {
                found.push(relative.to_path_buf());
            }
        }
        Ok(found)
    }

    /// Rewrites the content of every marked file.
    ///
    /// The original content of a rewritten file is kept next to it with the
    /// backup suffix until [`Builder::cleanup`] runs.
    pub fn substitute(&self, marked: &[PathBuf]) -> BuildResult<usize> {
        let mut rewritten = 0;
        for relative in marked {
            let path = self.template_root.join(relative);
            let content = read_text(&path)?;
            let Some(new_content) = self.substitutor.apply(&content) else {
                debug!("No substitutions in {}", relative.display());
                continue;
            };

            copy_file(&path, &with_appended_suffix(&path, BACKUP_SUFFIX))?;
            fs::write(&path, new_content).map_err(|source| BuildError::FileError {
                path: path.display().to_string(),
                source,
            })?;
            debug!("Rewrote {}", relative.display());
            rewritten += 1;
        }
        Ok(rewritten)
    }

    /// Applies the rename map, then parameterizes keyword literals in names,
    /// then guards conditional paths.
    pub fn rename_structure(&self) -> BuildResult<usize> {
        let mut renamed = 0;

        for rename in &self.manifest.renames {
            let old = self.template_root.join(&rename.from);
            if !old.exists() {
                return Err(BuildError::MissingPathError {
                    path: old.display().to_string(),
                    context: "rename map".to_string(),
                });
            }
            move_path(&old, &self.template_root.join(&rename.to))?;
            info!("Renamed {} -> {}", rename.from.display(), rename.to.display());
            renamed += 1;
        }

        let keywords = self.substitutor.keywords();
        renamed += self.rename_names(|name| {
            if has_template_syntax(name) || !keywords.is_match(name) {
                return None;
            }
            Some(keywords.replace(name).0.into_owned())
        })?;

        let suffix = self.manifest.marker_suffix.as_str();
        let patterns = &self.manifest.conditional_patterns;
        renamed += self.rename_names(|name| {
            if name.starts_with("{% if") {
                return None;
            }
            let (_, condition) =
                patterns.iter().find(|(fragment, _)| name.contains(fragment.as_str()))?;
            Some(match name.strip_suffix(suffix) {
                Some(stem) => format!("{{% if {condition} %}}{stem}{{% endif %}}{suffix}"),
                None => format!("{{% if {condition} %}}{name}{{% endif %}}"),
            })
        })?;

        Ok(renamed)
    }

    /// Renames every path whose file name `rename` maps to a new name.
    /// Children are visited before their parents so collected paths stay valid.
    fn rename_names<F>(&self, rename: F) -> BuildResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.template_root)
            .min_depth(1)
            .contents_first(true)
            .sort_by_file_name()
        {
            entries.push(entry?.into_path());
        }

        let mut renamed = 0;
        for path in entries {
            let relative = path.strip_prefix(&self.template_root).unwrap_or(&path);
            if self.preserved.contains(relative) || is_transient(&self.transient, relative) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(new_name) = rename(name) else {
                continue;
            };
            let target = path.with_file_name(&new_name);
            move_path(&path, &target)?;
            info!("Renamed {} -> {}", relative.display(), new_name);
            renamed += 1;
        }
        Ok(renamed)
    }

    /// Copies the static template files over the built template.
    ///
    /// A static file replaces the first template file with the same name;
    /// files without a counterpart land in the template root.
    pub fn overlay(&self) -> BuildResult<usize> {
        if !self.static_root.exists() {
            debug!("No static template directory at {}", self.static_root.display());
            return Ok(0);
        }

        let mut by_name: BTreeMap<std::ffi::OsString, PathBuf> = BTreeMap::new();
        for entry in WalkDir::new(&self.template_root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                by_name
                    .entry(entry.file_name().to_os_string())
                    .or_insert_with(|| entry.into_path());
            }
        }

        let mut statics = Vec::new();
        for entry in fs::read_dir(&self.static_root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                return Err(BuildError::StaticTemplateError(format!(
                    "directories are not supported: {}",
                    entry.path().display()
                )));
            }
            statics.push(entry.path());
        }
        statics.sort();

        for static_file in &statics {
            let Some(name) = static_file.file_name() else {
                continue;
            };
            let target = match by_name.get(name) {
                Some(existing) => {
                    info!("Replacing {} with static template file", existing.display());
                    existing.clone()
                }
                None => {
                    info!("Copying new static template file {}", static_file.display());
                    self.template_root.join(name)
                }
            };
            copy_file(static_file, &target)?;
        }
        Ok(statics.len())
    }

    /// Deletes substitution backups and other transient artifacts.
    pub fn cleanup(&self) -> BuildResult<usize> {
        let mut removed = 0;
        for path in find_transient(&self.template_root, &self.transient)? {
            if ensure_removed(&path)? {
                removed += 1;
            }
        }
        debug!("Removed {} transient artifact(s)", removed);
        Ok(removed)
    }

    /// Parses every file carrying the marker suffix.
    ///
    /// # Errors
    /// * `BuildError::TemplateSyntaxError` naming the first file that fails to parse
    pub fn verify(&self) -> BuildResult<usize> {
        let suffix = self.manifest.marker_suffix.as_str();
        let mut verified = 0;
        for entry in WalkDir::new(&self.template_root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !entry.file_name().to_string_lossy().ends_with(suffix) {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.template_root).unwrap_or(entry.path());
            self.validator.validate(relative, &read_text(entry.path())?)?;
            verified += 1;
        }
        debug!("Verified {} template file(s)", verified);
        Ok(verified)
    }
}

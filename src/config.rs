//! Build manifest handling.
//! The manifest holds every list that drives a build. A compiled-in default
//! describes the canonical source project; a YAML file may replace it.

use crate::constants::{
    DEFAULT_STATIC_TEMPLATE_DIR, DEFAULT_TEMPLATE_DIR, MARKER_SUFFIX, UNCOMMENT_MARKER,
};
use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A literal that must be escaped so the templating engine emits it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Escape {
    pub search: String,
    pub replace: String,
}

/// A path whose name must change after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything a single template build needs to know.
///
/// Paths in `include` are relative to the source directory; all other path
/// lists are relative to the template directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub template_dir: PathBuf,
    pub static_template_dir: PathBuf,
    pub marker_suffix: String,
    pub preserve: Vec<PathBuf>,
    pub include: Vec<PathBuf>,
    pub exclude: Vec<PathBuf>,
    pub templatize: Vec<PathBuf>,
    /// Whether files outside `templatize` that need rewriting are marked too
    pub discover: bool,
    /// Placeholder key to literal, e.g. `package_name: my_package`
    pub keyword_map: IndexMap<String, String>,
    pub escapes: Vec<Escape>,
    pub uncomment_markers: Vec<String>,
    pub renames: Vec<Rename>,
    /// File name fragment to the condition guarding the file's existence
    pub conditional_patterns: IndexMap<String, String>,
    /// Globs removed during cleanup on top of the built-in transient patterns
    pub transient_patterns: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        let package = "fractal_tasks_template";
        let escape = |expr: &str| Escape {
            search: format!("{{{{ {expr} }}}}"),
            replace: format!("{{{{ '{{{{' }}}} {expr} {{{{ '}}}}' }}}}"),
        };

        Self {
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            static_template_dir: PathBuf::from(DEFAULT_STATIC_TEMPLATE_DIR),
            marker_suffix: MARKER_SUFFIX.to_string(),
            preserve: vec![
                PathBuf::from("copier.yml"),
                PathBuf::from("{{_copier_conf.answers_file}}.jinja"),
            ],
            include: ["src", "tests", "pyproject.toml", ".gitignore", ".pre-commit-config.yaml", ".github"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            exclude: vec![
                Path::new("src").join("build_template"),
                Path::new("tests").join("copier"),
                Path::new(".github").join("workflows").join("copier_ci.yml"),
                Path::new(".github").join("workflows").join("github_release.yaml"),
                Path::new(".github").join("workflows").join("github_release.yml"),
            ],
            templatize: vec![
                PathBuf::from("pyproject.toml"),
                Path::new("src").join(package).join("__init__.py"),
                Path::new("src").join(package).join("dev").join("task_list.py"),
                Path::new("tests").join("__init__.py"),
            ],
            discover: true,
            keyword_map: IndexMap::from([
                ("package_name".to_string(), package.to_string()),
                ("project_name".to_string(), "fractal-tasks-template".to_string()),
                ("author_name".to_string(), "Fractal Core Team".to_string()),
                ("project_url".to_string(), "project_url.uzh.ch".to_string()),
            ]),
            escapes: vec![escape("matrix.python-version"), escape("matrix.os")],
            uncomment_markers: vec![UNCOMMENT_MARKER.to_string()],
            renames: vec![Rename {
                from: Path::new("src").join(package),
                to: Path::new("src").join("{{ package_name }}"),
            }],
            conditional_patterns: IndexMap::from([(
                "threshold_segmentation_task".to_string(),
                "include_segmentation_task".to_string(),
            )]),
            transient_patterns: vec![],
        }
    }
}

impl Manifest {
    /// Placeholder written in place of the literal mapped to `key`.
    pub fn placeholder(key: &str) -> String {
        format!("{{{{ {key} }}}}")
    }

    /// Checks the invariants the pipeline relies on before touching the disk.
    ///
    /// # Errors
    /// * `BuildError::PatternError` for empty or ambiguous keyword literals
    /// * `BuildError::ConfigError` for an empty marker suffix or unsafe paths
    pub fn validate(&self) -> BuildResult<()> {
        if self.marker_suffix.is_empty() || !self.marker_suffix.starts_with('.') {
            return Err(BuildError::ConfigError(format!(
                "marker suffix '{}' must be a non-empty extension starting with '.'",
                self.marker_suffix
            )));
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (key, literal) in &self.keyword_map {
            if key.trim().is_empty() {
                return Err(BuildError::PatternError("empty placeholder key".to_string()));
            }
            if literal.is_empty() {
                return Err(BuildError::PatternError(format!(
                    "keyword '{}' maps to an empty literal",
                    key
                )));
            }
            if let Some(other) = seen.insert(literal.as_str(), key.as_str()) {
                return Err(BuildError::PatternError(format!(
                    "literal '{}' is mapped to both '{}' and '{}'",
                    literal, other, key
                )));
            }
        }

        for escape in &self.escapes {
            if escape.search.is_empty() {
                return Err(BuildError::PatternError("escape with empty search string".to_string()));
            }
        }
        if self.uncomment_markers.iter().any(String::is_empty) {
            return Err(BuildError::PatternError("empty uncomment marker".to_string()));
        }
        if self.conditional_patterns.keys().any(String::is_empty) {
            return Err(BuildError::PatternError("empty conditional pattern".to_string()));
        }

        let relative = self
            .preserve
            .iter()
            .chain(&self.include)
            .chain(&self.exclude)
            .chain(&self.templatize)
            .chain(self.renames.iter().flat_map(|r| [&r.from, &r.to]));
        for path in relative {
            if !is_contained(path) {
                return Err(BuildError::ConfigError(format!(
                    "path '{}' must be relative and stay inside its root",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

fn is_contained(path: &Path) -> bool {
    use std::path::Component;

    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Parses a manifest from YAML content.
///
/// Fields left out of the document keep their compiled-in defaults.
///
/// # Errors
/// * `BuildError::YamlError` if the content does not match the schema
/// * Any error reported by [`Manifest::validate`]
pub fn parse_manifest(content: &str) -> BuildResult<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(content)?;
    manifest.validate()?;
    Ok(manifest)
}

/// Loads the manifest for a build.
///
/// # Arguments
/// * `config_path` - Optional YAML manifest; `None` selects the compiled-in default
///
/// # Returns
/// * `BuildResult<Manifest>` - Validated manifest
pub fn get_manifest<P: AsRef<Path>>(config_path: Option<P>) -> BuildResult<Manifest> {
    match config_path {
        Some(path) => {
            let path = path.as_ref();
            if !path.is_file() {
                return Err(BuildError::ConfigError(format!(
                    "Invalid configuration path: {}",
                    path.display()
                )));
            }
            debug!("Loading manifest from {}", path.display());
            parse_manifest(&std::fs::read_to_string(path)?)
        }
        None => {
            debug!("Using the built-in manifest");
            let manifest = Manifest::default();
            manifest.validate()?;
            Ok(manifest)
        }
    }
}

//! Error handling for the template builder.
//! Defines the error type and result alias used by every pipeline step.

use std::io;
use thiserror::Error;

/// Errors that abort a template build.
///
/// Every variant that concerns a file carries the offending path so the
/// diagnostic printed by [`default_error_handler`] is actionable on its own.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Directory traversal failed
    #[error("Walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Reading or writing a specific file failed
    #[error("Cannot process '{path}': {source}.")]
    FileError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A path the pipeline depends on is missing from the source or template tree
    #[error("Missing path: '{path}' does not exist ({context}).")]
    MissingPathError { path: String, context: String },

    /// A preserved control file was removed from the previous template by hand
    #[error("Preserved control file '{path}' is missing from '{template_dir}'.")]
    MissingPreservedFileError { path: String, template_dir: String },

    /// The build manifest could not be read or is inconsistent
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The build manifest is not valid YAML for the expected schema
    #[error("Manifest parse error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    /// A keyword or escape pattern cannot be used for substitution
    #[error("Substitution error: {0}.")]
    PatternError(String),

    /// A transient-artifact glob is invalid
    #[error("Glob error: {0}.")]
    GlobError(#[from] globset::Error),

    /// A templatized file is not a valid Jinja template after substitution
    #[error("Template error in '{path}': {source}.")]
    TemplateSyntaxError {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// The static template directory contains something other than plain files
    #[error("Static template error: {0}.")]
    StaticTemplateError(String),

    /// Git repository access failed during the up-to-date check
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// The freshly built template differs from the committed one
    #[error("Check failed: template directory '{template_dir}' has {changes} uncommitted change(s).")]
    CheckFailedError { template_dir: String, changes: usize },
}

/// Convenience type alias for Results with BuildError as the error type.
pub type BuildResult<T> = Result<T, BuildError>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: BuildError) {
    eprintln!("{}", err);
    std::process::exit(1);
}

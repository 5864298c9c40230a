//! template-builder derives a generic, parameterized project template from a
//! canonical source project. It copies a fixed set of paths, rewrites literal
//! values into `{{ placeholder }}` markers, and renames files so a Jinja-style
//! templating engine can later render new projects from the result.

/// Template build pipeline
/// Reset, copy, purge, templatize, substitute, rename, overlay, cleanup, verify
pub mod builder;

/// Up-to-date check of the built template against the git index
pub mod check;

/// Command-line interface module
pub mod cli;

/// Build manifest: the lists and settings that drive a build
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// File system primitives
pub mod fsops;

/// Transient artifact patterns
pub mod ignore;

/// Literal-to-placeholder substitution
pub mod keywords;

/// Logger initialization
pub mod logger;

/// Template syntax verification
pub mod render;

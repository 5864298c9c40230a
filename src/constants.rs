//! Common constants used throughout the template builder.

/// Suffix telling the templating engine a file must be rendered
pub const MARKER_SUFFIX: &str = ".jinja";

/// Suffix of the backups the substitution step leaves behind until cleanup
pub const BACKUP_SUFFIX: &str = ".bak";

/// Default template output directory, relative to the source directory
pub const DEFAULT_TEMPLATE_DIR: &str = "template";

/// Default directory holding hand-written template files to overlay
pub const DEFAULT_STATIC_TEMPLATE_DIR: &str = "static_template";

/// Marker that comments out template directives in the source project
pub const UNCOMMENT_MARKER: &str = "# --- #";

/// Interpreter and OS litter that never belongs in a template
pub const TRANSIENT_PATTERNS: [&str; 7] = [
    "**/*.bak",
    "**/*.pyc",
    "**/*.pyo",
    "**/*.pyd",
    "**/__pycache__",
    "**/.DS_Store",
    "**/.ipynb_checkpoints",
];

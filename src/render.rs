//! Template syntax verification.
//! The built template is rendered later by an external engine; parsing every
//! templatized file here catches malformed placeholders before they ship.

use crate::error::{BuildError, BuildResult};
use minijinja::Environment;
use std::path::Path;

/// Trait for checking template sources.
pub trait TemplateValidator {
    /// Parses `source`; `path` only names the file in diagnostics.
    fn validate(&self, path: &Path, source: &str) -> BuildResult<()>;
}

/// MiniJinja-based validator using the engine's default syntax.
pub struct MiniJinjaValidator {
    env: Environment<'static>,
}

impl MiniJinjaValidator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Renders a template file's content with sample answers.
    ///
    /// The build itself never renders; this is for library callers previewing
    /// what a generated project would contain, e.g. that escaped expressions
    /// come out verbatim.
    pub fn render(&self, source: &str, context: &minijinja::Value) -> BuildResult<String> {
        self.env
            .render_str(source, context)
            .map_err(|source| BuildError::TemplateSyntaxError {
                path: "<inline>".to_string(),
                source,
            })
    }
}

impl Default for MiniJinjaValidator {
    fn default() -> Self {
        MiniJinjaValidator::new()
    }
}

impl TemplateValidator for MiniJinjaValidator {
    fn validate(&self, path: &Path, source: &str) -> BuildResult<()> {
        let mut env = self.env.clone();
        env.add_template_owned(path.display().to_string(), source.to_string())
            .map_err(|source| BuildError::TemplateSyntaxError {
                path: path.display().to_string(),
                source,
            })
    }
}

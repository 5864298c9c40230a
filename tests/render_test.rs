use std::path::Path;
use template_builder::error::BuildError;
use template_builder::render::{MiniJinjaValidator, TemplateValidator};

#[test]
fn test_valid_template() {
    let validator = MiniJinjaValidator::new();
    let source = "name = \"{{ project_name }}\"\n{% if include_task %}task{% endif %}\n";
    assert!(validator.validate(Path::new("pyproject.toml.jinja"), source).is_ok());
}

#[test]
fn test_invalid_template_names_file() {
    let validator = MiniJinjaValidator::new();
    match validator.validate(Path::new("src/broken.py.jinja"), "{% if x %}never closed") {
        Err(BuildError::TemplateSyntaxError { path, .. }) => {
            assert_eq!(path, "src/broken.py.jinja")
        }
        other => panic!("Expected TemplateSyntaxError, got {:?}", other),
    }
}

#[test]
fn test_render_keeps_trailing_newline() {
    let validator = MiniJinjaValidator::new();
    let context = minijinja::context! { package_name => "my_pkg" };
    let result = validator.render("import {{ package_name }}\n", &context).unwrap();
    assert_eq!(result, "import my_pkg\n");
}

#[test]
fn test_escaped_expression_renders_verbatim() {
    let validator = MiniJinjaValidator::new();
    let result = validator
        .render("${{ '{{' }} matrix.os {{ '}}' }}", &minijinja::context!())
        .unwrap();
    assert_eq!(result, "${{ matrix.os }}");
}

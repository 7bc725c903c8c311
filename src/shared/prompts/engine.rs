//! Jinja prompt templates.
//!
//! Templates ship inside the binary and can be overridden by files of the same
//! name under `templates/prompts/`, so prompts can be tuned without a rebuild.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATE_DIR: &str = "templates/prompts";

/// Built-in templates, keyed by their path relative to `TEMPLATE_DIR`
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        "breeds/features.jinja",
        include_str!("../../../templates/prompts/breeds/features.jinja"),
    ),
    (
        "breeds/suggest.jinja",
        include_str!("../../../templates/prompts/breeds/suggest.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in EMBEDDED_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load embedded template {}: {}", name, e);
        }
    }

    let template_path = Path::new(TEMPLATE_DIR);
    if template_path.exists() {
        load_templates_recursive(&mut env, template_path, template_path);
    }

    env
}

fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }

        let Ok(relative) = path.strip_prefix(base_path) else {
            continue;
        };
        let name = relative.to_string_lossy().replace('\\', "/");
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                // Loaded once per process, so leaking gives the 'static lifetime
                let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
                let static_content: &'static str = Box::leak(content.into_boxed_str());
                if let Err(e) = env.add_template(static_name, static_content) {
                    tracing::warn!("Failed to load template {}: {}", name, e);
                } else {
                    tracing::debug!("Loaded template override: {}", name);
                }
            }
            Err(e) => tracing::warn!("Failed to read template {}: {}", name, e),
        }
    }
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render `template_name` (relative to `templates/prompts/`) with `ctx`
///
/// ```ignore
/// let mut ctx = HashMap::new();
/// ctx.insert("features", Value::from("long white fur, flat face"));
/// let prompt = render_template("breeds/suggest.jinja", &ctx)?;
/// ```
pub fn render_template(
    template_name: &str,
    ctx: &HashMap<&str, Value>,
) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    let render_ctx = Value::from_iter(ctx.iter().map(|(k, v)| (*k, v.clone())));

    template
        .render(render_ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}

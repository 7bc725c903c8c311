//! Prompt templates for the breed suggestion flow.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// First step: ask the model to describe breed-relevant features of a photo
pub fn render_breed_features_prompt(json_schema: &str) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("json_schema", Value::from(json_schema));

    render_template("breeds/features.jinja", &ctx)
}

/// Second step: turn the described features into a list of breed names
pub fn render_breed_suggest_prompt(
    features: &str,
    max_suggestions: usize,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("features", Value::from(features));
    ctx.insert("max_suggestions", Value::from(max_suggestions));

    render_template("breeds/suggest.jinja", &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_prompt_embeds_schema() {
        let prompt = render_breed_features_prompt(r#"{"type":"object"}"#).unwrap();
        assert!(prompt.contains(r#"{"type":"object"}"#));
        assert!(prompt.contains("fur length"));
    }

    #[test]
    fn test_suggest_prompt() {
        let prompt = render_breed_suggest_prompt("orange tabby, short fur", 5).unwrap();
        assert!(prompt.contains("orange tabby, short fur"));
        assert!(prompt.contains(r#"["Breed 1", "Breed 2", "Breed 3"]"#));
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

use super::LlmResponse;

lazy_static! {
    /// `,}` or `,]` with optional whitespace in between
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// `"a" + "b"` style concatenation
    static ref JS_STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

const JSON_REPAIR_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level JSON value the caller expects from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }
}

/// Pull the JSON payload of the given shape out of free-form model output
///
/// Looks at, in order: a ```json fenced block, any fenced block, the trimmed
/// text itself, then the widest open/close delimiter span in the text.
pub fn extract_json(text: &str, shape: JsonShape) -> Result<String, String> {
    let (open, close) = shape.delimiters();

    if let Some(rest) = text.split("```json").nth(1) {
        return rest
            .split("```")
            .next()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "Failed to extract JSON from markdown code block".to_string());
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        if let Some(newline_offset) = text[block_start..].find('\n') {
            let body_start = block_start + newline_offset + 1;
            if let Some(end_offset) = text[body_start..].find("```") {
                return Ok(text[body_start..body_start + end_offset].trim().to_string());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.starts_with(open) {
        return Ok(trimmed.to_string());
    }

    let start = text
        .find(open)
        .ok_or_else(|| format!("No JSON {:?} found in response", shape))?;
    let end = text
        .rfind(close)
        .ok_or_else(|| format!("Incomplete JSON {:?} in response", shape))?;

    if start < end {
        Ok(text[start..=end].to_string())
    } else {
        Err("Invalid JSON boundaries in response".to_string())
    }
}

/// Object-shaped [`extract_json`]
pub fn extract_json_string(text: &str) -> Result<String, String> {
    extract_json(text, JsonShape::Object)
}

/// `{"name": "Oyen",}` -> `{"name": "Oyen"}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

/// `"Persian" + " Mix"` -> `"Persian Mix"`
pub fn fix_js_string_concatenation(json_str: &str) -> String {
    JS_STRING_CONCAT_RE.replace_all(json_str, "").to_string()
}

fn apply_quick_fixes(json_str: &str) -> String {
    fix_trailing_commas(&fix_js_string_concatenation(json_str))
}

/// Run llm_json's repair, discarding results that panic or take too long
fn repair_json(json_str: &str) -> Option<String> {
    let started = Instant::now();
    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    if started.elapsed() > JSON_REPAIR_TIMEOUT {
        tracing::warn!("JSON repair exceeded {:?}", JSON_REPAIR_TIMEOUT);
        return None;
    }

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Extract, then parse with progressively more aggressive repairs
pub fn parse_json<T>(text: &str, shape: JsonShape) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let json_str = extract_json(text, shape)?;

    tracing::debug!(
        "Extracted JSON (first 500 chars): {}",
        json_str.chars().take(500).collect::<String>()
    );

    if let Ok(parsed) = serde_json::from_str::<T>(&json_str) {
        return Ok(parsed);
    }

    if let Ok(parsed) = serde_json::from_str::<T>(&apply_quick_fixes(&json_str)) {
        tracing::debug!("JSON parsed after quick fixes");
        return Ok(parsed);
    }

    if let Some(repaired) = repair_json(&json_str) {
        if let Ok(parsed) = serde_json::from_str::<T>(&repaired) {
            tracing::debug!("JSON parsed after llm_json repair");
            return Ok(parsed);
        }
    }

    Err(format!(
        "Failed to parse JSON after all repair attempts. Original: {}",
        json_str.chars().take(200).collect::<String>()
    ))
}

/// Parse model output into `T`, or return `T::default()` marked as a fallback
pub fn parse_with_fallback<T>(text: &str) -> T
where
    T: LlmResponse,
{
    match parse_json::<T>(text, JsonShape::Object) {
        Ok(parsed) => parsed,
        Err(error_msg) => {
            tracing::warn!("LLM response parsing failed, using fallback: {}", error_msg);
            let mut fallback = T::default();
            fallback.mark_as_fallback(error_msg);
            fallback
        }
    }
}

/// Parse a bare `["a", "b"]` list, dropping blank and duplicate entries
pub fn parse_string_list(text: &str) -> Result<Vec<String>, String> {
    let raw: Vec<String> = parse_json(text, JsonShape::Array)?;
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        let item = item.trim().to_string();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
    struct CatGuess {
        pub breed: String,
        pub confidence: Option<f32>,

        #[serde(default = "default_true")]
        #[schemars(skip)]
        pub is_llm_success: bool,

        #[serde(skip_serializing_if = "Option::is_none")]
        #[schemars(skip)]
        pub llm_error_message: Option<String>,
    }

    impl LlmResponse for CatGuess {
        fn mark_as_fallback(&mut self, error_message: String) {
            self.is_llm_success = false;
            self.llm_error_message = Some(error_message);
        }

        fn is_success(&self) -> bool {
            self.is_llm_success
        }
    }

    #[test]
    fn test_extract_from_json_fence() {
        let response = "Result:\n\n```json\n{\"breed\": \"Persian\"}\n```\n\nDone.";
        assert_eq!(
            extract_json_string(response).unwrap(),
            r#"{"breed": "Persian"}"#
        );
    }

    #[test]
    fn test_extract_from_generic_fence() {
        let response = "```\n[\"Persian\", \"Anggora\"]\n```";
        assert_eq!(
            extract_json(response, JsonShape::Array).unwrap(),
            r#"["Persian", "Anggora"]"#
        );
    }

    #[test]
    fn test_extract_embedded() {
        let response = "I think {\"breed\": \"Domestic Shorthair\"} fits best";
        assert_eq!(
            extract_json_string(response).unwrap(),
            r#"{"breed": "Domestic Shorthair"}"#
        );

        let list = "Suggestions: [\"Persian\"] (approximate)";
        assert_eq!(
            extract_json(list, JsonShape::Array).unwrap(),
            r#"["Persian"]"#
        );
    }

    #[test]
    fn test_extract_without_json() {
        assert!(extract_json_string("No JSON here").is_err());
        assert!(extract_json("still nothing", JsonShape::Array).is_err());
    }

    #[test]
    fn test_quick_fixes() {
        assert_eq!(
            fix_trailing_commas(r#"{"a": [1, 2,], "b": {"c": true,},}"#),
            r#"{"a": [1, 2], "b": {"c": true}}"#
        );
        assert_eq!(
            fix_js_string_concatenation(r#"{"breed": "Persian" +   " Mix"}"#),
            r#"{"breed": "Persian Mix"}"#
        );
    }

    #[test]
    fn test_parse_with_fallback_success() {
        let result: CatGuess = parse_with_fallback(r#"{"breed": "Persian", "confidence": 0.8,}"#);
        assert!(result.is_success());
        assert_eq!(result.breed, "Persian");
        assert_eq!(result.confidence, Some(0.8));
    }

    #[test]
    fn test_parse_with_fallback_marks_failure() {
        let result: CatGuess = parse_with_fallback("the cat looks fluffy");
        assert!(!result.is_success());
        assert!(result.llm_error_message.is_some());
        assert!(result.breed.is_empty());
    }

    #[test]
    fn test_parse_string_list() {
        let text = "```json\n[\"Persian\", \" Persian \", \"\", \"Anggora\",]\n```";
        assert_eq!(
            parse_string_list(text).unwrap(),
            vec!["Persian".to_string(), "Anggora".to_string()]
        );
        assert!(parse_string_list("no list").is_err());
    }

    #[test]
    fn test_schema_skips_internal_fields() {
        let schema = CatGuess::json_schema_string();
        assert!(schema.contains("breed"));
        assert!(!schema.contains("is_llm_success"));
    }
}

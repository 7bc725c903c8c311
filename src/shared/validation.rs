use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidateUrl, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::shared::constants::MAX_REPORT_IMAGES;

lazy_static! {
    /// Runs of whitespace (spaces, tabs, newlines) inside single-line inputs
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Trim a single-line input and collapse inner whitespace runs to one space
///
/// - " Oyen   Kecil " -> "Oyen Kecil"
pub fn normalize_line(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Between 1 and MAX_REPORT_IMAGES well-formed URLs
pub fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.is_empty() || urls.len() > MAX_REPORT_IMAGES {
        return Err(error_with_message(
            "image_count",
            "A report needs between 1 and 5 images",
        ));
    }
    if urls.iter().any(|url| !url.validate_url()) {
        return Err(error_with_message(
            "image_url",
            "Every image must be a valid URL",
        ));
    }
    Ok(())
}

/// Flatten validator output into "field: message" entries, sorted for stable output
///
/// Nested structs are reported with their own field names.
pub fn field_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect_field_errors(errors, &mut out);
    out.sort();
    out
}

fn collect_field_errors(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(format!("{}: {}", field, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_field_errors(nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line(" Oyen   Kecil "), "Oyen Kecil");
        assert_eq!(normalize_line("Jl.\tMenteng\nRaya"), "Jl. Menteng Raya");
        assert_eq!(normalize_line("   "), "");
    }

    #[test]
    fn test_image_urls() {
        let one = vec!["https://cdn.example.com/public/cats/u/1.jpg".to_string()];
        assert!(validate_image_urls(&one).is_ok());
        assert!(validate_image_urls(&[]).is_err());

        let six = vec![one[0].clone(); 6];
        assert!(validate_image_urls(&six).is_err());

        let bad = vec!["not a url".to_string()];
        assert!(validate_image_urls(&bad).is_err());
    }
}

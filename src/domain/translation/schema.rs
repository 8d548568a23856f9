//! Shape validation for translated form fragments.

use serde_json::Value;

use crate::domain::foundation::ValidationError;

/// Top-level sections a translation response may contain.
pub const TRANSLATION_SECTIONS: [&str; 4] = ["app", "pages", "ui", "errorMessages"];

/// Checks that a model response looks like a translated form fragment.
///
/// At least one known section must be present, and each present section
/// must have the right container type: `pages` an array, the rest objects.
pub fn validate_translation_response(value: &Value) -> Result<(), ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::wrong_type("translation", "a JSON object"))?;

    if !TRANSLATION_SECTIONS.iter().any(|s| object.contains_key(*s)) {
        return Err(ValidationError::invalid_format(
            "translation",
            format!("expected at least one of {}", TRANSLATION_SECTIONS.join(", ")),
        ));
    }

    if let Some(pages) = object.get("pages") {
        if !pages.is_array() {
            return Err(ValidationError::wrong_type("pages", "an array"));
        }
    }

    for section in ["app", "ui", "errorMessages"] {
        if let Some(content) = object.get(section) {
            if !content.is_object() {
                return Err(ValidationError::wrong_type(section, "an object"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_any_single_section() {
        assert!(validate_translation_response(&json!({"app": {"title": "Hola"}})).is_ok());
        assert!(validate_translation_response(&json!({"pages": []})).is_ok());
        assert!(validate_translation_response(&json!({"ui": {}})).is_ok());
        assert!(validate_translation_response(&json!({"errorMessages": {}})).is_ok());
    }

    #[test]
    fn rejects_payload_without_known_sections() {
        let err = validate_translation_response(&json!({"title": "Hola"})).unwrap_err();
        assert_eq!(err.field(), "translation");
    }

    #[test]
    fn rejects_pages_that_are_not_an_array() {
        let err = validate_translation_response(&json!({"pages": {"p1": {}}})).unwrap_err();
        assert_eq!(err, ValidationError::wrong_type("pages", "an array"));
    }

    #[test]
    fn rejects_ui_that_is_not_an_object() {
        assert!(validate_translation_response(&json!({"ui": "texts"})).is_err());
    }

    #[test]
    fn rejects_non_object() {
        assert!(validate_translation_response(&json!(["app"])).is_err());
    }
}

//! Translation request and result value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::language::LanguageDetail;

/// A generated form and the languages to translate it into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub form_json: Value,
    pub target_languages: Vec<String>,
    pub source_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_details: Option<Vec<LanguageDetail>>,
}

impl TranslationRequest {
    pub fn new(form_json: Value, target_languages: Vec<String>, source_language: impl Into<String>) -> Self {
        Self {
            form_json,
            target_languages,
            source_language: source_language.into(),
            language_details: None,
        }
    }

    pub fn with_language_details(mut self, details: Vec<LanguageDetail>) -> Self {
        self.language_details = Some(details);
        self
    }
}

/// Outcome of translating one form into several languages.
///
/// `success` is true iff no language failed; `translations` only holds
/// languages that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
}

impl TranslationResult {
    /// Assembles a result from per-language outcomes.
    pub fn from_parts(
        translations: BTreeMap<String, Value>,
        errors: Vec<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: errors.is_empty(),
            translations: Some(translations),
            errors: if errors.is_empty() { None } else { Some(errors) },
            processing_time_ms,
        }
    }

    /// Whole-request failure with no translations.
    pub fn failure(error: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            translations: None,
            errors: Some(vec![error.into()]),
            processing_time_ms,
        }
    }

    pub fn translation(&self, code: &str) -> Option<&Value> {
        self.translations.as_ref().and_then(|t| t.get(code))
    }

    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_parts_without_errors_is_success() {
        let mut translations = BTreeMap::new();
        translations.insert("es".to_string(), json!({"app": {}}));

        let result = TranslationResult::from_parts(translations, vec![], 12);
        assert!(result.success);
        assert!(result.errors.is_none());
        assert!(result.translation("es").is_some());
    }

    #[test]
    fn from_parts_with_errors_is_failure() {
        let result = TranslationResult::from_parts(BTreeMap::new(), vec!["fr: boom".into()], 1);
        assert!(!result.success);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn serializes_processing_time_name() {
        let json = serde_json::to_value(TranslationResult::failure("bad", 5)).unwrap();
        assert_eq!(json["processingTime"], 5);
        assert!(json.get("translations").is_none());
    }
}

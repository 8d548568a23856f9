//! Multi-language request detection result.

use serde::{Deserialize, Serialize};

/// Display metadata for one language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDetail {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

impl LanguageDetail {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        native_name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            native_name: native_name.into(),
        }
    }
}

/// Whether the user wants the form in several languages, and which.
///
/// `requested_languages` has already been filtered to the supported
/// allow-list, deduplicated and truncated; `language_details` is derived
/// from the static catalog, never from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiLanguageAnalysis {
    pub is_multi_language_requested: bool,
    pub requested_languages: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_languages: Vec<String>,
    pub language_details: Vec<LanguageDetail>,
}

impl MultiLanguageAnalysis {
    /// Single-language result for the given default language.
    pub fn single_language(default_language: &str, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            is_multi_language_requested: false,
            requested_languages: vec![default_language.to_string()],
            confidence,
            reasoning: reasoning.into(),
            suggested_languages: Vec::new(),
            language_details: super::get_language_details(&[default_language.to_string()]),
        }
    }

    /// Requested languages other than `source`, in request order.
    pub fn target_languages(&self, source: &str) -> Vec<String> {
        self.requested_languages
            .iter()
            .filter(|code| code.as_str() != source)
            .cloned()
            .collect()
    }
}

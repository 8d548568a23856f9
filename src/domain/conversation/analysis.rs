//! Prompt completeness analysis value object.

use serde::{Deserialize, Serialize};

/// Confidence above which a complete analysis ends questioning.
pub const COMPLETENESS_THRESHOLD: f64 = 0.7;

/// Well-known information categories a prompt can be missing.
pub mod categories {
    pub const FORM_PURPOSE: &str = "form_purpose";
    pub const REQUIRED_FIELDS: &str = "required_fields";
    pub const VALIDATION_RULES: &str = "validation_rules";
}

/// Result of judging whether a prompt holds enough detail to build a form.
///
/// Produced fresh on every analysis call and replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptAnalysis {
    pub is_complete: bool,
    pub missing_categories: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl PromptAnalysis {
    /// Builds an analysis, clamping confidence and deduplicating categories.
    pub fn new(
        is_complete: bool,
        missing_categories: Vec<String>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            is_complete,
            missing_categories: dedup_ordered(missing_categories),
            confidence: clamp_unit(confidence),
            reasoning: reasoning.into(),
            suggested_questions: Vec::new(),
        }
    }

    pub fn with_suggested_questions(mut self, questions: Vec<String>) -> Self {
        self.suggested_questions = questions;
        self
    }

    /// Applies the completeness rule: `is_complete && confidence > threshold`.
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.is_complete && self.confidence > threshold
    }

    /// One-line description used in agent messages and prompts.
    pub fn summary(&self) -> String {
        if self.missing_categories.is_empty() {
            format!(
                "complete={} (confidence {:.2}): {}",
                self.is_complete, self.confidence, self.reasoning
            )
        } else {
            format!(
                "complete={} (confidence {:.2}), missing: {}: {}",
                self.is_complete,
                self.confidence,
                self.missing_categories.join(", "),
                self.reasoning
            )
        }
    }
}

/// Clamps a value into [0, 1]; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Removes duplicates while keeping first-seen order.
pub fn dedup_ordered(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_confidence() {
        assert_eq!(PromptAnalysis::new(true, vec![], 1.7, "r").confidence, 1.0);
        assert_eq!(PromptAnalysis::new(true, vec![], -0.2, "r").confidence, 0.0);
        assert_eq!(PromptAnalysis::new(true, vec![], f64::NAN, "r").confidence, 0.0);
    }

    #[test]
    fn new_deduplicates_categories_in_order() {
        let analysis = PromptAnalysis::new(
            false,
            vec!["b".into(), "a".into(), "b".into()],
            0.4,
            "r",
        );
        assert_eq!(analysis.missing_categories, vec!["b", "a"]);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!PromptAnalysis::new(true, vec![], 0.7, "r").meets_threshold(COMPLETENESS_THRESHOLD));
        assert!(PromptAnalysis::new(true, vec![], 0.71, "r").meets_threshold(COMPLETENESS_THRESHOLD));
        assert!(!PromptAnalysis::new(false, vec![], 0.99, "r").meets_threshold(COMPLETENESS_THRESHOLD));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(PromptAnalysis::new(false, vec!["x".into()], 0.5, "r")).unwrap();
        assert_eq!(json["isComplete"], false);
        assert_eq!(json["missingCategories"][0], "x");
    }

    #[test]
    fn summary_mentions_missing_categories() {
        let analysis = PromptAnalysis::new(false, vec![categories::FORM_PURPOSE.into()], 0.3, "vague");
        assert!(analysis.summary().contains("form_purpose"));
    }
}

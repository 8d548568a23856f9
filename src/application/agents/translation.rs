//! Form translation.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::base::{measure_execution_time, retry_with_backoff, try_parse_json, BaseAgent};
use super::errors::AgentError;
use crate::config::TranslationConfig;
use crate::domain::language::{language_detail, LanguageDetail};
use crate::domain::translation::{validate_translation_response, TranslationRequest, TranslationResult};
use crate::ports::{AIProvider, ApiConfigSource};

const SYSTEM_PROMPT: &str = "You are a professional translator for user interface text. \
You translate form definitions and respond with JSON only.";

const OUTPUT_SCHEMA: &str = r#"{
  "app": { "title": "..." },
  "pages": [
    {
      "title": "...",
      "components": [
        {
          "label": "...",
          "placeholder": "...",
          "helpText": "...",
          "options": ["..."],
          "errorMessages": { "required": "..." }
        }
      ]
    }
  ],
  "ui": { "next": "...", "previous": "...", "submit": "...", "required": "..." },
  "errorMessages": { "required": "{fieldLabel} is required", "minLength": "..." }
}"#;

/// Translates a generated form into the requested languages.
#[derive(Clone)]
pub struct TranslationGenerationAgent {
    base: BaseAgent,
    config: TranslationConfig,
}

impl TranslationGenerationAgent {
    pub const NAME: &'static str = "TranslationGenerationAgent";

    pub fn new(
        provider: Arc<dyn AIProvider>,
        api_source: Arc<dyn ApiConfigSource>,
        config: TranslationConfig,
    ) -> Self {
        let base = BaseAgent::new(Self::NAME, provider, api_source)
            .with_temperature(0.2)
            .with_timeout(config.timeout());
        Self::from_base(base, config)
    }

    pub fn from_base(base: BaseAgent, config: TranslationConfig) -> Self {
        Self { base, config }
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// Translates `request.form_json` into each target language in turn.
    ///
    /// Never fails: a language that cannot be translated adds one entry to
    /// `errors` and the others proceed.
    pub async fn generate_translations(&self, request: &TranslationRequest) -> TranslationResult {
        let started = Instant::now();
        let elapsed_ms = || started.elapsed().as_millis() as u64;

        if !request.form_json.is_object() {
            return TranslationResult::failure("formJson must be a JSON object", elapsed_ms());
        }
        if request.target_languages.iter().any(|code| code.trim().is_empty()) {
            return TranslationResult::failure("target language codes cannot be blank", elapsed_ms());
        }

        let targets = unique_codes(&request.target_languages);
        let form = match serde_json::to_string_pretty(&request.form_json) {
            Ok(form) => form,
            Err(e) => return TranslationResult::failure(format!("formJson: {}", e), elapsed_ms()),
        };

        let mut translations = BTreeMap::new();
        let mut errors = Vec::new();

        for code in &targets {
            let detail = detail_for(request, code);
            let prompt = build_prompt(&form, &request.source_language, &detail);
            let label = format!("translate to {}", code);

            let this = self;
            let prompt = prompt.as_str();
            let timed = measure_execution_time(
                &label,
                retry_with_backoff(
                    move || this.translate_once(prompt),
                    self.config.max_retries,
                    self.config.base_delay(),
                ),
            )
            .await;

            match timed.result {
                Ok(value) => match validate_translation_response(&value) {
                    Ok(()) => {
                        translations.insert(code.clone(), value);
                    }
                    Err(e) => {
                        tracing::warn!(agent = Self::NAME, language = %code, error = %e, "translation rejected");
                        errors.push(format!("{}: {}", code, e));
                    }
                },
                Err(e) => {
                    tracing::warn!(agent = Self::NAME, language = %code, error = %e, "translation failed");
                    errors.push(format!("{}: {}", code, e));
                }
            }
        }

        let result = TranslationResult::from_parts(translations, errors, elapsed_ms());
        tracing::info!(
            agent = Self::NAME,
            success = result.success,
            errors = result.error_count(),
            processing_time_ms = result.processing_time_ms,
            "translation finished"
        );
        result
    }

    async fn translate_once(&self, prompt: &str) -> Result<Value, AgentError> {
        let raw = self.base.invoke(prompt, Some(SYSTEM_PROMPT), None).await?;
        try_parse_json(&raw)
    }
}

fn unique_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .map(|code| code.trim().to_lowercase())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

fn detail_for(request: &TranslationRequest, code: &str) -> LanguageDetail {
    request
        .language_details
        .as_ref()
        .and_then(|details| details.iter().find(|d| d.code == code).cloned())
        .unwrap_or_else(|| language_detail(code))
}

fn build_prompt(form: &str, source_language: &str, target: &LanguageDetail) -> String {
    format!(
        "Translate the user-facing text of this form from {source} into {name} ({native}, code \"{code}\").\n\n\
         Form JSON:\n{form}\n\n\
         Return JSON with exactly this structure:\n{schema}\n\n\
         Rules:\n\
         - Translate only string values shown to users.\n\
         - Never translate ids, option values, field names or other technical keys.\n\
         - Keep placeholders such as {{fieldLabel}} and {{minLength}} exactly as written.\n\
         - Keep the page and component order of the original form.\n\
         - Respond with the JSON object only.",
        source = language_detail(source_language).name,
        name = target.name,
        native = target.native_name,
        code = target.code,
        form = form,
        schema = OUTPUT_SCHEMA,
    )
}

//! Integration tests for form translation.
//!
//! Covers the translation agent on its own and the manager's merge of
//! translations into the generated form under both fallback policies.

use serde_json::{json, Value};
use std::sync::Arc;

use formcraft::adapters::{MockAIProvider, MockError, StaticApiConfigSource};
use formcraft::application::agents::TranslationGenerationAgent;
use formcraft::application::{AgentSet, ConversationManager};
use formcraft::config::{AppConfig, TranslationConfig, TranslationFallbackPolicy};
use formcraft::domain::translation::TranslationRequest;
use formcraft::ports::ApiConfig;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn api_source() -> Arc<StaticApiConfigSource> {
    Arc::new(StaticApiConfigSource::new(
        ApiConfig::new("test", "http://localhost", "gpt-4o-mini").with_api_key("test_api_key"),
    ))
}

fn translation_config(max_retries: u32) -> TranslationConfig {
    let mut config = TranslationConfig::default();
    config.max_retries = max_retries;
    config.base_delay_ms = 0;
    config
}

fn form() -> Value {
    json!({
        "app": {"title": "Contact us"},
        "pages": [{"title": "Your details", "components": [{"id": "email", "label": "Email"}]}],
        "errorMessages": {"required": "{fieldLabel} is required"}
    })
}

fn spanish() -> String {
    json!({
        "app": {"title": "Contáctenos"},
        "pages": [{"title": "Sus datos", "components": [{"id": "email", "label": "Correo"}]}],
        "errorMessages": {"required": "{fieldLabel} es obligatorio"}
    })
    .to_string()
}

fn french_down() -> MockError {
    MockError::Unavailable { message: "translation backend down".into() }
}

fn manager(provider: &MockAIProvider, policy: TranslationFallbackPolicy) -> ConversationManager {
    let mut config = AppConfig::default();
    config.translation = translation_config(1);
    config.translation.fallback_policy = policy;
    let agents = AgentSet::new(Arc::new(provider.clone()), api_source(), &config);
    ConversationManager::new(agents, config.conversation)
}

fn multilingual_provider() -> MockAIProvider {
    MockAIProvider::new()
        .with_response_when(
            "Analyze this form request",
            json!({"isComplete": true, "missingCategories": [], "confidence": 0.9, "reasoning": "ok"}).to_string(),
        )
        .with_response_when(
            "Supported language codes",
            json!({
                "isMultiLanguageRequested": true,
                "requestedLanguages": ["en", "es", "fr"],
                "confidence": 0.95,
                "reasoning": "three languages listed"
            })
            .to_string(),
        )
        .with_response_when("into Spanish", spanish())
        .with_error_when("into French", french_down())
}

// =============================================================================
// Translation agent
// =============================================================================

#[tokio::test]
async fn one_failing_language_does_not_block_the_others() {
    let provider = MockAIProvider::new()
        .with_response_when("into Spanish", spanish())
        .with_error_when("into French", french_down());
    let agent = TranslationGenerationAgent::new(Arc::new(provider.clone()), api_source(), translation_config(2));

    let request = TranslationRequest::new(form(), vec!["es".into(), "fr".into()], "en");
    let result = agent.generate_translations(&request).await;

    assert!(!result.success);
    assert_eq!(result.translation("es").unwrap()["pages"][0]["components"][0]["id"], "email");
    assert!(result.translation("fr").is_none());

    let errors = result.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("fr"));
    // es once, fr for both of its two attempts
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn empty_targets_succeed_without_calls() {
    let provider = MockAIProvider::new();
    let agent = TranslationGenerationAgent::new(Arc::new(provider.clone()), api_source(), translation_config(3));

    let result = agent
        .generate_translations(&TranslationRequest::new(form(), vec![], "en"))
        .await;

    assert!(result.success);
    assert!(result.translations.unwrap().is_empty());
    assert!(result.errors.is_none());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn non_object_form_is_rejected_up_front() {
    let provider = MockAIProvider::new();
    let agent = TranslationGenerationAgent::new(Arc::new(provider.clone()), api_source(), translation_config(3));

    let result = agent
        .generate_translations(&TranslationRequest::new(json!(["not", "a", "form"]), vec!["es".into()], "en"))
        .await;

    assert!(!result.success);
    assert!(result.translations.is_none());
    assert_eq!(result.error_count(), 1);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn prompt_keeps_placeholders_and_names_the_target() {
    let provider = MockAIProvider::new().with_response(spanish());
    let agent = TranslationGenerationAgent::new(Arc::new(provider.clone()), api_source(), translation_config(0));

    agent
        .generate_translations(&TranslationRequest::new(form(), vec!["es".into()], "en"))
        .await;

    let calls = provider.get_calls();
    let prompt = calls[0].user_prompt().unwrap_or_default();
    assert!(prompt.contains("from English into Spanish"));
    assert!(prompt.contains("{fieldLabel}"));
    assert!(prompt.contains("\"email\""));
}

// =============================================================================
// Manager merge
// =============================================================================

#[tokio::test]
async fn merge_successful_policy_keeps_partial_translations() {
    let provider = multilingual_provider();
    let mut manager = manager(&provider, TranslationFallbackPolicy::MergeSuccessful);

    manager.start_conversation("Bilingual contact form with email").await;
    assert!(manager.language_analysis().unwrap().is_multi_language_requested);

    let merged = manager.generate_form_with_translations(form()).await;

    assert_eq!(merged["defaultLanguage"], "en");
    assert_eq!(merged["supportedLanguages"], json!(["en", "es"]));
    assert_eq!(merged["translations"]["es"]["app"]["title"], "Contáctenos");
    assert!(merged["translations"].get("fr").is_none());
    assert_eq!(merged["app"]["title"], "Contact us");

    let note = manager.conversation_history().last().unwrap().content().to_string();
    assert!(note.contains("fr"));
}

#[tokio::test]
async fn return_original_policy_discards_partial_translations() {
    let provider = multilingual_provider();
    let mut manager = manager(&provider, TranslationFallbackPolicy::ReturnOriginal);

    manager.start_conversation("Bilingual contact form with email").await;
    let result = manager.generate_form_with_translations(form()).await;

    assert_eq!(result, form());
}

#[tokio::test]
async fn single_language_conversation_returns_form_untouched() {
    let provider = MockAIProvider::new()
        .with_response(json!({"isComplete": true, "confidence": 0.9, "reasoning": "ok"}).to_string())
        .with_response(
            json!({"isMultiLanguageRequested": false, "requestedLanguages": ["en"], "confidence": 0.9, "reasoning": "none"})
                .to_string(),
        );
    let mut manager = manager(&provider, TranslationFallbackPolicy::MergeSuccessful);

    manager.start_conversation("Contact form").await;
    let calls_before = provider.call_count();
    let result = manager.generate_form_with_translations(form()).await;

    assert_eq!(result, form());
    assert_eq!(provider.call_count(), calls_before);
}

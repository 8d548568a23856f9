//! Conversation orchestration.
//!
//! `ConversationManager` drives one prompt-to-form conversation: it analyzes
//! the prompt, asks clarifying questions until the analysis is confident,
//! and finally hands a [`FormGenerationContext`] to the form generator.
//!
//! # Flow
//!
//! ```text
//! start_conversation ─► analyze ─┬─► complete
//!                                └─► ask questions ◄─┐
//! process_user_response ─► all answered? ─► re-analyze ─┴─► complete
//! ```
//!
//! Agent degradations never abort the flow; they are recorded as `system`
//! messages in the transcript.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::application::agents::{generate_fallback_questions, AgentOutcome, AgentSet};
use crate::config::{ConversationConfig, TranslationFallbackPolicy};
use crate::domain::conversation::{
    AgentQuestion, ConversationMessage, ConversationPhase, ConversationState,
    FormGenerationContext, PromptAnalysis,
};
use crate::domain::foundation::SessionId;
use crate::domain::language::{get_language_details, MultiLanguageAnalysis};
use crate::domain::translation::TranslationRequest;

const READY_MESSAGE: &str = "I have everything I need. Ready to generate your form.";
const BEST_EFFORT_MESSAGE: &str = "I couldn't pin down every detail, so I'll proceed with \
estimated details. You can refine the form after it is generated.";
const SKIP_MESSAGE: &str = "Skipping the remaining questions. I'll generate the form from \
the information gathered so far and fill any gaps with sensible defaults.";

/// Drives one conversation from initial prompt to form generation.
pub struct ConversationManager {
    agents: AgentSet,
    config: ConversationConfig,
    state: ConversationState,
    original_prompt: String,
    language_analysis: Option<MultiLanguageAnalysis>,
    rounds: u32,
}

impl ConversationManager {
    pub fn new(agents: AgentSet, config: ConversationConfig) -> Self {
        Self::with_session(agents, config, SessionId::new())
    }

    pub fn with_session(agents: AgentSet, config: ConversationConfig, session_id: SessionId) -> Self {
        Self {
            agents,
            config,
            state: ConversationState::new(session_id),
            original_prompt: String::new(),
            language_analysis: None,
            rounds: 0,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.state.session_id
    }

    /// Starts a fresh conversation from `prompt`, discarding any previous one.
    pub async fn start_conversation(&mut self, prompt: &str) -> &ConversationState {
        self.reset_conversation();
        self.original_prompt = prompt.trim().to_string();

        tracing::info!(session_id = %self.state.session_id, "starting conversation");

        self.state.add_message(ConversationMessage::user(prompt));
        self.transition(ConversationPhase::Analyzing);

        let analysis = self.run_analysis(prompt).await;
        self.language_analysis = Some(self.detect_languages(prompt).await);

        self.state
            .add_message(ConversationMessage::agent(analysis_message(&analysis)));
        self.state.set_analysis(analysis.clone());

        if analysis.meets_threshold(self.config.completeness_threshold) {
            self.complete(false, READY_MESSAGE);
        } else {
            self.ask_questions(&analysis).await;
        }

        &self.state
    }

    /// Records the user's reply and, once every question is answered,
    /// re-analyzes the enriched prompt.
    pub async fn process_user_response(
        &mut self,
        answer: &str,
        question_id: Option<&str>,
    ) -> &ConversationState {
        self.state.add_message(ConversationMessage::user(answer));

        if self.state.is_complete || self.state.phase == ConversationPhase::Init {
            tracing::debug!(
                session_id = %self.state.session_id,
                phase = self.state.phase.label(),
                "reply outside the question loop"
            );
            return &self.state;
        }

        if let Some(id) = question_id {
            if !self.state.record_answer(id, answer) {
                tracing::debug!(session_id = %self.state.session_id, question_id = id, "answer for a question that was not pending");
            }
        }

        if !self.state.current_questions.is_empty() {
            return &self.state;
        }

        self.reanalyze().await;
        &self.state
    }

    /// Stops questioning and marks the conversation ready for generation.
    pub fn skip_to_form_generation(&mut self) -> &ConversationState {
        if !self.state.is_complete {
            tracing::info!(session_id = %self.state.session_id, "user skipped remaining questions");
            self.complete(true, SKIP_MESSAGE);
        }
        &self.state
    }

    /// Adds translations to a generated form when several languages were requested.
    ///
    /// Returns the form unchanged when no multi-language request was detected.
    /// On translation failure the configured fallback policy decides between
    /// the original form and a merge of the languages that succeeded.
    pub async fn generate_form_with_translations(&mut self, form_json: Value) -> Value {
        let Some(language) = self
            .language_analysis
            .as_ref()
            .filter(|l| l.is_multi_language_requested)
        else {
            return form_json;
        };

        let source = self.agents.language.config().default_language.clone();
        let targets = language.target_languages(&source);
        if targets.is_empty() {
            return form_json;
        }

        let request = TranslationRequest::new(form_json.clone(), targets.clone(), source.clone())
            .with_language_details(language.language_details.clone());
        let result = self.agents.translation.generate_translations(&request).await;

        if !result.success {
            let errors = result.errors.clone().unwrap_or_default().join("; ");
            self.note_degradation("Translation", &errors);
            if self.agents.translation.config().fallback_policy == TranslationFallbackPolicy::ReturnOriginal {
                return form_json;
            }
        }

        let translations = result.translations.unwrap_or_default();
        if translations.is_empty() {
            return form_json;
        }

        match form_json {
            Value::Object(form) => merge_translations(form, &source, &targets, translations),
            other => other,
        }
    }

    /// Discards the conversation, keeping the session id.
    pub fn reset_conversation(&mut self) {
        self.state = ConversationState::new(self.state.session_id);
        self.original_prompt.clear();
        self.language_analysis = None;
        self.rounds = 0;
    }

    pub fn current_state(&self) -> &ConversationState {
        &self.state
    }

    pub fn conversation_history(&self) -> &[ConversationMessage] {
        &self.state.messages
    }

    pub fn current_questions(&self) -> &[AgentQuestion] {
        &self.state.current_questions
    }

    pub fn gathered_information(&self) -> &BTreeMap<String, String> {
        &self.state.context
    }

    pub fn language_analysis(&self) -> Option<&MultiLanguageAnalysis> {
        self.language_analysis.as_ref()
    }

    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    /// Hand-off bundle for form generation; `None` until complete.
    pub fn form_generation_context(&self) -> Option<FormGenerationContext> {
        FormGenerationContext::from_state(&self.original_prompt, &self.state)
    }

    async fn reanalyze(&mut self) {
        self.rounds += 1;
        self.transition(ConversationPhase::Reanalyzing);

        let prompt = self.updated_prompt();
        let analysis = self.run_analysis(&prompt).await;
        self.state.set_analysis(analysis.clone());

        tracing::info!(
            session_id = %self.state.session_id,
            round = self.rounds,
            confidence = analysis.confidence,
            complete = analysis.is_complete,
            "re-analysis finished"
        );

        if analysis.meets_threshold(self.config.completeness_threshold) {
            self.complete(false, READY_MESSAGE);
        } else if self.rounds >= self.config.max_rounds {
            tracing::warn!(session_id = %self.state.session_id, rounds = self.rounds, "round limit reached");
            self.complete(true, BEST_EFFORT_MESSAGE);
        } else {
            self.ask_questions(&analysis).await;
        }
    }

    async fn run_analysis(&mut self, prompt: &str) -> PromptAnalysis {
        let outcome = self.agents.analysis.analyze_prompt(prompt).await;
        self.record_outcome("Prompt analysis", outcome)
    }

    async fn detect_languages(&self, prompt: &str) -> MultiLanguageAnalysis {
        let outcome = self.agents.language.detect_multi_language_request(prompt).await;
        if let Some(reason) = outcome.fallback_reason() {
            tracing::warn!(session_id = %self.state.session_id, reason, "language detection degraded");
        }
        outcome.into_value()
    }

    async fn ask_questions(&mut self, analysis: &PromptAnalysis) {
        let outcome = self
            .agents
            .questions
            .generate_questions(analysis, self.state.recent_messages(self.config.history_window))
            .await;

        let mut questions: Vec<AgentQuestion> = self
            .record_outcome("Question generation", outcome)
            .into_iter()
            .filter(|q| !self.state.is_answered(&q.id))
            .collect();

        // The first round always asks something.
        if questions.is_empty() && self.rounds == 0 {
            tracing::info!(session_id = %self.state.session_id, "model proposed no questions, using canned ones");
            questions = generate_fallback_questions(analysis);
        }

        if questions.is_empty() {
            tracing::info!(session_id = %self.state.session_id, "no new questions, completing with estimates");
            self.complete(true, BEST_EFFORT_MESSAGE);
            return;
        }

        self.transition(ConversationPhase::AwaitingAnswers);
        for question in &questions {
            self.state.add_message(ConversationMessage::question(
                question.question.clone(),
                question.id.clone(),
                question.category.clone(),
            ));
        }
        self.state.set_questions(questions);
    }

    fn record_outcome<T>(&mut self, source: &str, outcome: AgentOutcome<T>) -> T {
        if let Some(reason) = outcome.fallback_reason() {
            let reason = reason.to_string();
            self.note_degradation(source, &reason);
        }
        outcome.into_value()
    }

    fn note_degradation(&mut self, source: &str, reason: &str) {
        tracing::warn!(session_id = %self.state.session_id, source, reason, "agent degraded");
        self.state.add_message(ConversationMessage::system(format!(
            "{} fell back to default values: {}",
            source, reason
        )));
    }

    fn complete(&mut self, best_effort: bool, message: &str) {
        if let Err(e) = self.state.mark_complete(best_effort) {
            tracing::warn!(session_id = %self.state.session_id, error = %e, "could not mark conversation complete");
        }
        self.state.add_message(ConversationMessage::agent(message));
    }

    fn transition(&mut self, target: ConversationPhase) {
        if let Err(e) = self.state.advance(target) {
            tracing::warn!(
                session_id = %self.state.session_id,
                from = self.state.phase.label(),
                to = target.label(),
                error = %e,
                "invalid phase transition"
            );
        }
    }

    /// Original prompt followed by every gathered answer.
    fn updated_prompt(&self) -> String {
        let gathered = self.state.gathered_lines();
        if gathered.is_empty() {
            return self.original_prompt.clone();
        }
        format!(
            "{}\n\nAdditional information:\n{}",
            self.original_prompt,
            gathered.join("\n")
        )
    }
}

fn analysis_message(analysis: &PromptAnalysis) -> String {
    if analysis.is_complete {
        format!(
            "Your request looks complete (confidence {:.0}%). {}",
            analysis.confidence * 100.0,
            analysis.reasoning
        )
    } else if analysis.missing_categories.is_empty() {
        format!("I need a bit more detail. {}", analysis.reasoning)
    } else {
        format!(
            "I need a bit more detail about: {}. {}",
            analysis.missing_categories.join(", ").replace('_', " "),
            analysis.reasoning
        )
    }
}

fn merge_translations(
    mut form: Map<String, Value>,
    source: &str,
    targets: &[String],
    translations: BTreeMap<String, Value>,
) -> Value {
    let mut supported = vec![source.to_string()];
    supported.extend(
        targets
            .iter()
            .filter(|code| translations.contains_key(code.as_str()))
            .cloned(),
    );

    let details = serde_json::to_value(get_language_details(&supported)).unwrap_or(Value::Null);

    form.insert(
        "translations".to_string(),
        Value::Object(translations.into_iter().collect()),
    );
    form.insert("defaultLanguage".to_string(), Value::from(source));
    form.insert("supportedLanguages".to_string(), Value::from(supported));
    form.insert("languageDetails".to_string(), details);
    Value::Object(form)
}

//! Interactive terminal front end.
//!
//! Reads a form request from the first argument (or the first stdin line),
//! answers the pending clarifying questions one line at a time and prints the
//! form-generation context as JSON once the conversation completes. Typing
//! `skip` stops questioning early.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use formcraft::adapters::{MockAIProvider, OpenAICompatibleProvider, StaticApiConfigSource};
use formcraft::application::{AgentSet, ConversationManager};
use formcraft::config::{AiProvider, AppConfig};
use formcraft::ports::AIProvider as AIProviderPort;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formcraft=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let provider: Arc<dyn AIProviderPort> = match config.ai.provider {
        AiProvider::OpenAI => Arc::new(OpenAICompatibleProvider::with_timeout(config.ai.timeout())?),
        AiProvider::Mock => Arc::new(MockAIProvider::new()),
    };
    tracing::info!(
        provider = %provider.provider_info().name,
        model = %config.ai.model,
        "formcraft starting"
    );

    let api_source = Arc::new(StaticApiConfigSource::new(config.ai.api_config()));
    let agents = AgentSet::new(provider, api_source, &config);
    let mut manager = ConversationManager::new(agents, config.conversation.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let prompt = match std::env::args().nth(1) {
        Some(prompt) => prompt,
        None => {
            eprintln!("Describe the form you need:");
            lines.next_line().await?.unwrap_or_default()
        }
    };
    if prompt.trim().is_empty() {
        return Err("a form request is required".into());
    }

    manager.start_conversation(&prompt).await;

    while !manager.current_state().is_complete {
        let pending = manager
            .current_questions()
            .iter()
            .find(|q| !manager.current_state().is_answered(&q.id))
            .map(|q| (q.id.clone(), q.question.clone(), q.options.clone()));

        let Some((question_id, text, options)) = pending else {
            manager.skip_to_form_generation();
            break;
        };

        eprintln!("\n{text}");
        if let Some(options) = options {
            eprintln!("  options: {}", options.join(", "));
        }

        let Some(answer) = lines.next_line().await? else {
            manager.skip_to_form_generation();
            break;
        };
        if answer.trim().eq_ignore_ascii_case("skip") {
            manager.skip_to_form_generation();
            break;
        }

        manager.process_user_response(&answer, Some(&question_id)).await;
    }

    if let Some(context) = manager.form_generation_context() {
        println!("{}", serde_json::to_string_pretty(&context)?);
    }
    if let Some(language) = manager.language_analysis() {
        tracing::info!(
            requested = ?language.requested_languages,
            multi_language = language.is_multi_language_requested,
            "language analysis"
        );
    }

    Ok(())
}

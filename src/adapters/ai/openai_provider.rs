//! OpenAI-compatible Provider - Implementation of AIProvider over HTTP.
//!
//! Talks to any endpoint implementing the OpenAI REST shape. The endpoint,
//! key and model come from the `ApiConfig` carried by each request.
//!
//! - Chat-compatible endpoints: `POST {base_url}/chat/completions`, with the
//!   system prompt sent under the configured `system_key` role.
//! - Legacy endpoints: `POST {base_url}/completions`, with the system and
//!   user prompts joined into one `prompt`.
//!
//! Retries are left to the calling agent.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, ApiConfig, CompletionRequest, CompletionResponse, FinishReason,
    MessageRole, ProviderInfo, TokenUsage,
};

/// Default timeout when a request does not carry one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP provider for OpenAI-compatible endpoints.
pub struct OpenAICompatibleProvider {
    client: Client,
    default_timeout: Duration,
}

impl OpenAICompatibleProvider {
    /// Creates a provider with its own HTTP client.
    pub fn new() -> Result<Self, AIError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a provider whose requests default to `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, AIError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    fn endpoint(api: &ApiConfig) -> String {
        let base = api.base_url.trim_end_matches('/');
        if api.is_chat_completion_compatible {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/completions", base)
        }
    }

    fn to_chat_request(request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(ChatMessage {
                role: request.api.system_key.clone(),
                content: prompt.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: match msg.role {
                    MessageRole::System => request.api.system_key.clone(),
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
            });
        }

        ChatRequest {
            model: request.api.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: Self::temperature(request),
        }
    }

    fn to_legacy_request(request: &CompletionRequest) -> LegacyRequest {
        let mut parts = Vec::new();
        if let Some(ref prompt) = request.system_prompt {
            parts.push(prompt.clone());
        }
        parts.extend(request.messages.iter().map(|m| m.content.clone()));

        LegacyRequest {
            model: request.api.model.clone(),
            prompt: parts.join("\n\n"),
            max_tokens: request.max_tokens,
            temperature: Self::temperature(request),
        }
    }

    fn temperature(request: &CompletionRequest) -> Option<f32> {
        if request.api.supports_temperature {
            request.temperature
        } else {
            None
        }
    }

    /// Sends the request and maps transport failures.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let api_key = request
            .api
            .api_key()
            .ok_or_else(|| AIError::InvalidRequest("missing API key".to_string()))?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let builder = self
            .client
            .post(Self::endpoint(&request.api))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout);

        let builder = if request.api.is_chat_completion_compatible {
            builder.json(&Self::to_chat_request(request))
        } else {
            builder.json(&Self::to_legacy_request(request))
        };

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else if e.is_connect() {
                AIError::network(format!("Connection failed: {}", e))
            } else {
                AIError::network(e.to_string())
            }
        })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 | 404 | 422 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        let message = serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string));

        if let Some(s) = message {
            if let Some(idx) = s.find("try again in ") {
                let rest = &s[idx + 13..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
        30
    }

    async fn parse_response(
        &self,
        request: &CompletionRequest,
        response: Response,
    ) -> Result<CompletionResponse, AIError> {
        let response = Self::handle_response_status(response).await?;

        if request.api.is_chat_completion_compatible {
            let body: ChatResponse = response
                .json()
                .await
                .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

            let choice = body
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AIError::parse("No choices in response"))?;

            Ok(CompletionResponse {
                content: choice.message.content.unwrap_or_default(),
                usage: body.usage.map(Usage::into_token_usage).unwrap_or_default(),
                model: body.model.unwrap_or_else(|| request.api.model.clone()),
                finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
            })
        } else {
            let body: LegacyResponse = response
                .json()
                .await
                .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

            let choice = body
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AIError::parse("No choices in response"))?;

            Ok(CompletionResponse {
                content: choice.text,
                usage: body.usage.map(Usage::into_token_usage).unwrap_or_default(),
                model: body.model.unwrap_or_else(|| request.api.model.clone()),
                finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
            })
        }
    }
}

#[async_trait]
impl AIProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            agent = %request.metadata.agent,
            trace_id = %request.metadata.trace_id,
            provider = %request.api.name,
            model = %request.api.model,
            "sending completion request"
        );

        let response = self.send_request(&request).await?;
        self.parse_response(&request, response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai-compatible")
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct LegacyRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    model: Option<String>,
    choices: Vec<LegacyChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct LegacyChoice {
    text: String,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl Usage {
    fn into_token_usage(self) -> TokenUsage {
        TokenUsage::new(self.prompt_tokens, self.completion_tokens)
    }
}

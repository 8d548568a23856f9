//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::ApiConfig;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider implementation to run
    #[serde(default)]
    pub provider: AiProvider,

    /// Display name of the endpoint
    #[serde(default = "default_name")]
    pub name: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Role name for system messages
    #[serde(default = "default_system_key")]
    pub system_key: String,

    /// Whether the endpoint speaks chat-completions
    #[serde(default = "default_true")]
    pub chat_completions: bool,

    /// Whether the model accepts a temperature
    #[serde(default = "default_true")]
    pub supports_temperature: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    /// Canned responses, no network
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Endpoint settings handed to the agents
    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(&self.name, &self.base_url, &self.model)
            .with_system_key(&self.system_key)
            .with_chat_completions(self.chat_completions)
            .with_temperature_support(self.supports_temperature);

        match self.api_key {
            Some(ref key) => config.with_api_key(key.clone()),
            None => config,
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.provider == AiProvider::OpenAI {
            if !self.has_api_key() {
                return Err(ValidationError::MissingRequired("AI__API_KEY"));
            }
            if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
                return Err(ValidationError::InvalidBaseUrl);
            }
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            name: default_name(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            system_key: default_system_key(),
            chat_completions: true,
            supports_temperature: true,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_name() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_key() -> String {
    "system".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    60
}

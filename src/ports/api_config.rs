//! API configuration port.
//!
//! The provider settings (endpoint, key, model) are resolved outside this
//! crate, for example by a settings screen. Agents only need a synchronous
//! accessor returning the current value.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// Connection settings for the language model endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Display name of the provider (e.g., "openai").
    pub name: String,
    /// Base URL, without the trailing endpoint path.
    pub base_url: String,
    /// API key; `None` or empty means no credential is configured.
    #[serde(default)]
    api_key: Option<Secret<String>>,
    /// Role name used for the system message (e.g., "system" or "developer").
    #[serde(default = "default_system_key")]
    pub system_key: String,
    /// Model identifier.
    pub model: String,
    /// Whether the endpoint speaks the chat-completions protocol.
    #[serde(default = "default_true")]
    pub is_chat_completion_compatible: bool,
    /// Whether the model accepts a temperature parameter.
    #[serde(default = "default_true")]
    pub supports_temperature: bool,
}

impl ApiConfig {
    /// Creates a chat-compatible configuration without a key.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: None,
            system_key: default_system_key(),
            model: model.into(),
            is_chat_completion_compatible: true,
            supports_temperature: true,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(key.into()));
        self
    }

    /// Sets the system message role name.
    pub fn with_system_key(mut self, key: impl Into<String>) -> Self {
        self.system_key = key.into();
        self
    }

    /// Sets chat-completions compatibility.
    pub fn with_chat_completions(mut self, compatible: bool) -> Self {
        self.is_chat_completion_compatible = compatible;
        self
    }

    /// Sets temperature support.
    pub fn with_temperature_support(mut self, supported: bool) -> Self {
        self.supports_temperature = supported;
        self
    }

    /// Returns true if a non-blank API key is present.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Exposes the API key (for making requests).
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret().as_str())
    }
}

fn default_system_key() -> String {
    "system".to_string()
}

fn default_true() -> bool {
    true
}

/// Synchronous accessor for the currently selected API configuration.
pub trait ApiConfigSource: Send + Sync {
    fn api_config(&self) -> ApiConfig;
}

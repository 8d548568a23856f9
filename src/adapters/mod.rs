//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - Language model providers (OpenAI-compatible HTTP, mock)
//! - `api_config` - In-memory source for the active endpoint settings

pub mod ai;
mod api_config;

pub use ai::{MockAIProvider, MockError, MockResponse, OpenAICompatibleProvider};
pub use api_config::StaticApiConfigSource;

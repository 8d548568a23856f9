//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing and offline demos
//! - `OpenAICompatibleProvider` - Any endpoint speaking the OpenAI REST shape

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::OpenAICompatibleProvider;

//! Translation domain: requests, results and response-shape validation.

mod request;
mod schema;

pub use request::{TranslationRequest, TranslationResult};
pub use schema::{validate_translation_response, TRANSLATION_SECTIONS};

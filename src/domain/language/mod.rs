//! Language domain: detection results and the static language catalog.

mod analysis;
mod catalog;

pub use analysis::{LanguageDetail, MultiLanguageAnalysis};
pub use catalog::{
    get_language_details, is_known_language, language_detail, validate_language_codes,
    DEFAULT_SUPPORTED_LANGUAGES,
};

//! Static language metadata and code validation.
//!
//! The catalog is read-only data built once on first use; nothing in the
//! crate mutates it.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use super::LanguageDetail;

/// ISO-639-1 code → (English name, native name).
static LANGUAGE_NAMES: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| {
        HashMap::from([
            ("en", ("English", "English")),
            ("es", ("Spanish", "Español")),
            ("fr", ("French", "Français")),
            ("de", ("German", "Deutsch")),
            ("it", ("Italian", "Italiano")),
            ("pt", ("Portuguese", "Português")),
            ("nl", ("Dutch", "Nederlands")),
            ("sv", ("Swedish", "Svenska")),
            ("da", ("Danish", "Dansk")),
            ("no", ("Norwegian", "Norsk")),
            ("fi", ("Finnish", "Suomi")),
            ("pl", ("Polish", "Polski")),
            ("cs", ("Czech", "Čeština")),
            ("ru", ("Russian", "Русский")),
            ("uk", ("Ukrainian", "Українська")),
            ("el", ("Greek", "Ελληνικά")),
            ("tr", ("Turkish", "Türkçe")),
            ("ar", ("Arabic", "العربية")),
            ("he", ("Hebrew", "עברית")),
            ("hi", ("Hindi", "हिन्दी")),
            ("zh", ("Chinese", "中文")),
            ("ja", ("Japanese", "日本語")),
            ("ko", ("Korean", "한국어")),
            ("th", ("Thai", "ไทย")),
            ("vi", ("Vietnamese", "Tiếng Việt")),
            ("id", ("Indonesian", "Bahasa Indonesia")),
            ("ms", ("Malay", "Bahasa Melayu")),
        ])
    });

/// Codes accepted when no allow-list is configured.
pub const DEFAULT_SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "nl", "sv", "da", "no", "fi", "pl", "cs", "ru", "uk",
    "el", "tr", "ar", "he", "hi", "zh", "ja", "ko", "th", "vi", "id", "ms",
];

/// Looks up one code; unknown codes degrade to the upper-cased code.
pub fn language_detail(code: &str) -> LanguageDetail {
    match LANGUAGE_NAMES.get(code) {
        Some((name, native)) => LanguageDetail::new(code, *name, *native),
        None => {
            let upper = code.to_uppercase();
            LanguageDetail::new(code, upper.clone(), upper)
        }
    }
}

/// Details for every code, in input order. Pure function of the catalog.
pub fn get_language_details(codes: &[String]) -> Vec<LanguageDetail> {
    codes.iter().map(|code| language_detail(code)).collect()
}

/// Returns true if the catalog has display names for this code.
pub fn is_known_language(code: &str) -> bool {
    LANGUAGE_NAMES.contains_key(code)
}

/// Normalizes model-supplied codes against an allow-list.
///
/// Codes are trimmed and lower-cased, filtered to `supported`, deduplicated
/// keeping first occurrence, and truncated to `max_languages`.
pub fn validate_language_codes<S: AsRef<str>>(
    codes: &[String],
    supported: &[S],
    max_languages: usize,
) -> Vec<String> {
    let allowed: HashSet<String> = supported
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .collect();
    let mut seen = HashSet::new();

    codes
        .iter()
        .map(|code| code.trim().to_lowercase())
        .filter(|code| allowed.contains(code))
        .filter(|code| seen.insert(code.clone()))
        .take(max_languages)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_code_has_native_name() {
        let detail = language_detail("es");
        assert_eq!(detail.name, "Spanish");
        assert_eq!(detail.native_name, "Español");
    }

    #[test]
    fn unknown_code_degrades_to_uppercase() {
        let detail = language_detail("xx");
        assert_eq!(detail.code, "xx");
        assert_eq!(detail.name, "XX");
        assert_eq!(detail.native_name, "XX");
    }

    #[test]
    fn validate_filters_dedups_and_truncates() {
        let result = validate_language_codes(
            &codes(&["ES", "klingon", "fr", "es", "de", "it"]),
            DEFAULT_SUPPORTED_LANGUAGES,
            3,
        );
        assert_eq!(result, vec!["es", "fr", "de"]);
    }

    #[test]
    fn validate_with_empty_allow_list_returns_nothing() {
        let empty: [&str; 0] = [];
        assert!(validate_language_codes(&codes(&["en"]), &empty, 5).is_empty());
    }

    #[test]
    fn every_default_supported_language_is_in_catalog() {
        for code in DEFAULT_SUPPORTED_LANGUAGES {
            assert!(is_known_language(code), "{}", code);
        }
    }

    proptest! {
        #[test]
        fn validated_codes_are_supported_unique_and_bounded(
            input in proptest::collection::vec("[a-zA-Z]{1,3}", 0..20),
            max in 0usize..8,
        ) {
            let result = validate_language_codes(&input, DEFAULT_SUPPORTED_LANGUAGES, max);

            prop_assert!(result.len() <= max);
            let unique: HashSet<_> = result.iter().collect();
            prop_assert_eq!(unique.len(), result.len());
            for code in &result {
                prop_assert!(DEFAULT_SUPPORTED_LANGUAGES.contains(&code.as_str()));
            }
        }

        #[test]
        fn language_details_are_idempotent(
            input in proptest::collection::vec("[a-z]{2}", 0..10),
        ) {
            prop_assert_eq!(get_language_details(&input), get_language_details(&input));
        }
    }
}

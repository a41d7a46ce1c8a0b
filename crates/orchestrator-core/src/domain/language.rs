//! Language codes accepted by the search stage.

/// Two-letter codes the search stage can filter on.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "bg", "ca", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hr", "hu", "id",
    "is", "it", "iw", "ja", "ko", "lt", "lv", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sl",
    "sr", "sv", "tr", "zh",
];

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_two_lowercase_letters() {
        for code in SUPPORTED_LANGUAGES {
            assert_eq!(code.len(), 2, "{code}");
            assert!(code.chars().all(|c| c.is_ascii_lowercase()), "{code}");
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(is_supported("pt"));
        assert!(!is_supported("PT"));
        assert!(!is_supported("pt-br"));
        assert!(!is_supported(""));
    }
}

//! Shared utility functions used across the codebase.

use unicode_normalization::UnicodeNormalization;

/// Trim surrounding whitespace and normalize to Unicode NFC.
///
/// Visually identical strings built from different code-point sequences
/// (e.g. `"é"` vs `"e\u{301}"`) come out byte-equal.
pub fn sanitize_str(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Like [`sanitize_str`], for input that may be absent. `None` yields an empty string.
pub fn sanitize_opt(value: Option<&str>) -> String {
    value.map(sanitize_str).unwrap_or_default()
}

/// Current time as an RFC3339 string with millisecond precision.
pub fn now_string() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_str_trims_whitespace() {
        assert_eq!(sanitize_str("  Buy groceries \n\t"), "Buy groceries");
    }

    #[test]
    fn sanitize_str_composes_decomposed_sequences() {
        let decomposed = "Cafe\u{301}";
        let composed = "Caf\u{e9}";
        assert_ne!(decomposed, composed);
        assert_eq!(sanitize_str(decomposed), composed);
    }

    #[test]
    fn sanitize_str_is_idempotent() {
        for input in ["", "   ", " a ", "e\u{301}\u{301} x ", "\u{212b}ngstr\u{f6}m", "  Todo  "] {
            let once = sanitize_str(input);
            assert_eq!(sanitize_str(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn sanitize_str_of_whitespace_is_empty() {
        assert_eq!(sanitize_str(" \t\r\n "), "");
    }

    #[test]
    fn sanitize_opt_handles_missing_input() {
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some(" id-1 ")), "id-1");
    }

    #[test]
    fn now_string_is_rfc3339() {
        let now = now_string();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}

//! Short reference formatting and parsing.
//!
//! A short reference is the configured base URL followed by the decimal short
//! code, e.g. `http://localhost:8080/42`.

/// Ensures `base_url` ends with exactly one trailing slash.
///
/// # Examples
///
/// ```
/// use url_shortener_core::utils::short_url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://host"), "http://host/");
/// assert_eq!(normalize_base_url("http://host//"), "http://host/");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Builds the short reference for `code`.
///
/// `base_url` is expected to be normalized already.
pub fn format_short_url(base_url: &str, code: i64) -> String {
    format!("{base_url}{code}")
}

/// Extracts the short code from a reference or a bare path segment.
///
/// Accepts `http://host/42`, `/42` and `42`. Returns `None` when the last
/// segment is not a decimal integer.
///
/// # Examples
///
/// ```
/// use url_shortener_core::utils::short_url::parse_short_code;
///
/// assert_eq!(parse_short_code("http://host/42"), Some(42));
/// assert_eq!(parse_short_code("/7"), Some(7));
/// assert_eq!(parse_short_code("http://host/abc"), None);
/// ```
pub fn parse_short_code(reference: &str) -> Option<i64> {
    let segment = reference.trim_end_matches('/').rsplit('/').next()?;
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080/");
        assert_eq!(normalize_base_url("http://localhost:8080/"), "http://localhost:8080/");
    }

    #[test]
    fn test_format_short_url() {
        assert_eq!(format_short_url("http://host/", 1), "http://host/1");
    }

    #[test]
    fn test_round_trip() {
        let base = normalize_base_url("https://s.example.com");
        for code in [1, 42, 1_000_000] {
            assert_eq!(parse_short_code(&format_short_url(&base, code)), Some(code));
        }
    }

    #[test]
    fn test_parse_short_code_rejects_non_numeric() {
        assert_eq!(parse_short_code(""), None);
        assert_eq!(parse_short_code("http://host/"), None);
        assert_eq!(parse_short_code("http://host/1a"), None);
    }
}

//! Bearer token extraction from the `Authorization` header.

use axum::http::{HeaderMap, header::AUTHORIZATION};

const PREFIX: &str = "BEARER";

/// Returns the token carried by the `Authorization` header.
///
/// `None` means there is no header, or its value is not visible ASCII. A value
/// that starts with `Bearer` (any case) followed by at least one more byte has
/// the prefix and the byte after it removed. Any other value, including the
/// bare word `Bearer`, is returned as-is and left for signature verification to
/// reject.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    if value.len() > PREFIX.len() && value.as_bytes()[..PREFIX.len()].eq_ignore_ascii_case(PREFIX.as_bytes()) {
        // `to_str` guarantees ASCII, so every byte offset is a char boundary
        return Some(value.get(PREFIX.len() + 1..).unwrap_or_default().to_string());
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_strips_bearer_prefix() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers("bearer abc")).as_deref(), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("BEARER abc")).as_deref(), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("BeArEr abc")).as_deref(), Some("abc"));
    }

    #[test]
    fn test_value_without_prefix_is_passed_through() {
        assert_eq!(extract_bearer_token(&headers("abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")).as_deref(), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_bare_prefix_is_too_short_to_strip() {
        assert_eq!(extract_bearer_token(&headers("Bearer")).as_deref(), Some("Bearer"));
    }

    #[test]
    fn test_prefix_plus_separator_only_yields_empty_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer ")).as_deref(), Some(""));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_non_ascii_header_value() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap());
        assert_eq!(extract_bearer_token(&headers), None);
    }
}

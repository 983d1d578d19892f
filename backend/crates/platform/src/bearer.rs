//! Bearer credential extraction
//!
//! Credentials travel as `Authorization: Bearer <token>`. A missing header, a
//! different scheme, or an empty token are all reported as "no credential".

use http::{HeaderMap, header};

const BEARER_PREFIX: &str = "Bearer ";

/// Token part of an `Authorization` header value, if it uses the bearer scheme.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Bearer token from request headers.
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("Bearer   abc  "), Some("abc"));
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("bearer abc"), None);
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("abc"), None);
    }

    #[test]
    fn test_extract_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("tok"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token tok"));
        assert_eq!(extract_bearer(&headers), None);
    }
}

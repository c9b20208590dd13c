use crate::error::WardenError;
use axum::http::{header, request::Parts};

/// Extracts bearer token from request headers
pub struct TokenExtractor;

impl TokenExtractor {
    /// Extract token from the `Authorization: Bearer <token>` header
    pub fn from_header(parts: &Parts) -> Result<String, WardenError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| WardenError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            WardenError::unauthorized(
                "Invalid authorization header format. Expected: Bearer <token>",
            )
        })?;

        let token = token.trim();
        if token.is_empty() {
            return Err(WardenError::unauthorized("Empty bearer token"));
        }

        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(value: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_from_valid_bearer_header() {
        let token =
            TokenExtractor::from_header(&parts_with(Some("Bearer test_token_123"))).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_from_missing_header() {
        assert!(TokenExtractor::from_header(&parts_with(None)).is_err());
    }

    #[test]
    fn test_extract_from_invalid_format() {
        assert!(TokenExtractor::from_header(&parts_with(Some("Basic credentials"))).is_err());
        assert!(TokenExtractor::from_header(&parts_with(Some("bearer lowercase"))).is_err());
    }

    #[test]
    fn test_extract_empty_token() {
        let err = TokenExtractor::from_header(&parts_with(Some("Bearer   "))).unwrap_err();
        assert!(matches!(err, WardenError::Unauthorized(ref m) if m == "Empty bearer token"));
    }
}

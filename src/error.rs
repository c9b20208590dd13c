use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Reasons a presented token was refused.
///
/// All of these render identically to the client ("invalid token") so the
/// response does not reveal which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("signature does not verify")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("refresh token is no longer live")]
    Revoked,

    #[error("token claims are malformed")]
    MalformedClaims,

    #[error("token is not a compact JWS")]
    Malformed,
}

/// The main error type for warden
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Account already exists")]
    DuplicateAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Error body returned to clients.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl WardenError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The token rejection reason, if this is a token error.
    pub fn token_error(&self) -> Option<TokenError> {
        match self {
            Self::Token(e) => Some(*e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateAccount => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthorized(_) | Self::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Store(_) | Self::Signing(_) | Self::Internal(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for a client response.
    ///
    /// Validation failures echo their reason. Token failures collapse into a
    /// single message. Server-side failures never leak their details.
    fn safe_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::BadRequest(msg) => format!("Bad request: {}", msg),
            Self::DuplicateAccount => "Account already exists".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::Unauthorized(msg) => format!("Unauthorized: {}", msg),
            Self::Token(_) => "Unauthorized: invalid token".to_string(),
            Self::NotFound(msg) => format!("Not found: {}", msg),
            Self::Forbidden(msg) => format!("Forbidden: {}", msg),
            Self::Store(_) | Self::Signing(_) | Self::Internal(_) | Self::Anyhow(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for warden operations
pub type Result<T> = std::result::Result<T, WardenError>;

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            WardenError::BadRequest(format!("JSON error: {}", err))
        } else {
            WardenError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<validator::ValidationErrors> for WardenError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut field_errors: Vec<String> = err
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages: Vec<&str> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.as_ref())
                            .unwrap_or_else(|| e.code.as_ref())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        field_errors.sort();

        WardenError::Validation(field_errors.join("; "))
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for WardenError {
    fn from(err: redis::RedisError) -> Self {
        WardenError::Store(format!("Redis error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WardenError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WardenError::DuplicateAccount.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WardenError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WardenError::from(TokenError::Revoked).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WardenError::not_found("org").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WardenError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WardenError::store("down").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_error_accessor() {
        let err: WardenError = TokenError::Expired.into();
        assert_eq!(err.token_error(), Some(TokenError::Expired));
        assert_eq!(WardenError::InvalidCredentials.token_error(), None);
    }

    #[tokio::test]
    async fn test_token_errors_render_identically() {
        let mut bodies = Vec::new();
        for reason in [
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::Revoked,
            TokenError::MalformedClaims,
            TokenError::Malformed,
        ] {
            let body = body_json(WardenError::from(reason).into_response()).await;
            bodies.push(body["error"].as_str().unwrap().to_string());
        }
        assert!(bodies.iter().all(|b| b == "Unauthorized: invalid token"));
    }

    #[tokio::test]
    async fn test_internal_details_not_leaked() {
        let response = WardenError::store("connection refused to 10.0.0.3:6379").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body["error_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_validation_reason_echoed() {
        let response =
            WardenError::validation("Password must be at least 8 characters long").into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Password must be at least 8 characters long");
    }

    #[test]
    fn test_json_syntax_error_is_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(WardenError::from(err), WardenError::BadRequest(_)));
    }
}

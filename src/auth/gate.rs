use async_trait::async_trait;
use axum::http::request::Parts;

use super::claims::Identity;
use super::token::TokenExtractor;
use super::TokenService;
use crate::error::{Result, TokenError};
use crate::middleware::Interceptor;

/// Rejects requests without a valid access token and attaches the caller's
/// [`Identity`] to request extensions. Never touches a store.
#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenService,
}

impl AuthGate {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Interceptor for AuthGate {
    async fn intercept(&self, parts: &mut Parts) -> Result<()> {
        let token = TokenExtractor::from_header(parts).inspect_err(|e| {
            tracing::debug!(
                target: "auth.gate.denied",
                path = %parts.uri.path(),
                error = %e,
                "Missing bearer token"
            );
        })?;

        let claims = self.tokens.verify(&token).inspect_err(|e| {
            tracing::warn!(
                target: "auth.gate.denied",
                path = %parts.uri.path(),
                error = %e,
                "Bearer token rejected"
            );
        })?;

        if claims.is_refresh() {
            tracing::warn!(
                target: "auth.gate.denied",
                path = %parts.uri.path(),
                "Refresh token used as bearer"
            );
            return Err(TokenError::MalformedClaims.into());
        }

        parts.extensions.insert(Identity::from(claims));
        Ok(())
    }
}

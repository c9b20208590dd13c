use crate::auth::{TokenPair, TokenService};
use crate::config::RefreshRotation;
use crate::error::Result;

/// Refresh and revoke operations on an existing session.
#[derive(Clone)]
pub struct SessionFlow {
    tokens: TokenService,
    rotation: RefreshRotation,
}

impl SessionFlow {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens,
            rotation: RefreshRotation::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: RefreshRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Exchange a live refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = match self.tokens.verify_refresh_liveness(refresh_token).await {
            Ok(claims) => claims,
            Err(e) => {
                if let Some(reason) = e.token_error() {
                    tracing::warn!(
                        target: "auth.token.invalid",
                        reason = %reason,
                        "Refresh token rejected"
                    );
                }
                return Err(e);
            }
        };

        if self.rotation == RefreshRotation::SingleUse {
            self.tokens.revoke(refresh_token).await?;
        }

        let pair = self
            .tokens
            .issue_token_pair(&claims.username, &claims.email)
            .await?;

        tracing::info!(
            target: "auth.token.refresh",
            username = %claims.username,
            rotation = ?self.rotation,
            "Tokens refreshed"
        );

        Ok(pair)
    }

    /// Revoke a refresh token. Unknown or already-revoked tokens are accepted.
    pub async fn revoke(&self, refresh_token: &str) -> Result<()> {
        self.tokens.revoke(refresh_token).await?;
        tracing::info!(target: "auth.token.revoked", "Refresh token revoked");
        Ok(())
    }
}

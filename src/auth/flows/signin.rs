use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::{TokenPair, TokenService};
use crate::error::{Result, WardenError};
use crate::store::UserStore;

use super::types::SigninRequest;

/// Exchanges email and password for a token pair.
#[derive(Clone)]
pub struct SigninFlow {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    password_hasher: PasswordHasher,
}

impl SigninFlow {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            users,
            tokens,
            password_hasher: PasswordHasher::default(),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.password_hasher = hasher;
        self
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn signin(&self, req: SigninRequest) -> Result<TokenPair> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(WardenError::validation("Email and password are required"));
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(u) => u,
            None => {
                // Hash anyway so an unknown email costs the same as a wrong password
                let _ = self.password_hasher.hash(&req.password);
                tracing::warn!(
                    target: "auth.signin.failed",
                    reason = "unknown_email",
                    "Signin failed"
                );
                return Err(WardenError::InvalidCredentials);
            }
        };

        if !self.password_hasher.verify(&req.password, &user.password_hash)? {
            tracing::warn!(
                target: "auth.signin.failed",
                user_id = %user.id,
                reason = "password_mismatch",
                "Signin failed"
            );
            return Err(WardenError::InvalidCredentials);
        }

        let pair = self.tokens.issue_token_pair(&user.name, &user.email).await?;

        tracing::info!(target: "auth.signin", user_id = %user.id, "User signed in");

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordConfig;
    use crate::auth::{InMemoryRevocationStore, SigningKey, SigningKeys};
    use crate::store::{InMemoryStore, User};

    async fn setup() -> SigninFlow {
        let store = InMemoryStore::new();
        let hasher = PasswordHasher::new(PasswordConfig::fast());
        UserStore::insert(
            &store,
            User {
                id: "u1".into(),
                name: "alice".into(),
                email: "alice@example.com".into(),
                password_hash: hasher.hash("password123").unwrap(),
            },
        )
        .await
        .unwrap();

        let keys = SigningKeys::new(vec![SigningKey::new(
            "k1",
            b"test-secret-that-is-at-least-32-bytes!",
        )])
        .unwrap();
        let tokens = TokenService::new(keys, Arc::new(InMemoryRevocationStore::new()));
        SigninFlow::new(Arc::new(store), tokens).with_hasher(hasher)
    }

    fn request(email: &str, password: &str) -> SigninRequest {
        SigninRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_signin_success() {
        let flow = setup().await;
        let pair = flow
            .signin(request("Alice@Example.com", "password123"))
            .await
            .unwrap();

        let claims = flow.tokens.verify(&pair.access_token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let flow = setup().await;

        let wrong_password = flow
            .signin(request("alice@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let unknown_email = flow
            .signin(request("nobody@example.com", "password123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, WardenError::InvalidCredentials));
        assert!(matches!(unknown_email, WardenError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let flow = setup().await;
        let err = flow.signin(request("", "password123")).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation(_)));

        let err = flow.signin(request("alice@example.com", "")).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation(_)));
    }
}

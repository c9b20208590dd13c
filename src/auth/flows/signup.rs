use std::sync::Arc;
use validator::ValidateEmail;

use crate::auth::password::{PasswordHasher, PasswordPolicy};
use crate::auth::{TokenPair, TokenService};
use crate::error::{Result, WardenError};
use crate::store::{User, UserStore};

use super::types::SignupRequest;

/// Creates an account and signs the new user in.
#[derive(Clone)]
pub struct SignupFlow {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    password_hasher: PasswordHasher,
    password_policy: PasswordPolicy,
}

impl SignupFlow {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            users,
            tokens,
            password_hasher: PasswordHasher::default(),
            password_policy: PasswordPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.password_hasher = hasher;
        self
    }

    pub async fn signup(&self, req: SignupRequest) -> Result<TokenPair> {
        let username = req.username.trim();
        if username.is_empty() {
            return Err(WardenError::validation("Username is required"));
        }

        let email = req.email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(WardenError::validation("Invalid email format"));
        }

        self.password_policy.check(&req.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::info!(target: "auth.signup", "Signup rejected: email already registered");
            return Err(WardenError::DuplicateAccount);
        }

        let password_hash = self.password_hasher.hash(&req.password)?;
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: username.to_string(),
            email,
            password_hash,
        };

        // insert re-checks uniqueness atomically against a concurrent signup
        self.users.insert(user.clone()).await?;

        let pair = self.tokens.issue_token_pair(&user.name, &user.email).await?;

        tracing::info!(
            target: "auth.signup",
            user_id = %user.id,
            "User registered"
        );

        Ok(pair)
    }
}

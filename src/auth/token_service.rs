//! Token issuance, verification and refresh-token liveness.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden::auth::{InMemoryRevocationStore, SigningKey, SigningKeys, TokenService};
//!
//! let keys = SigningKeys::new(vec![SigningKey::new("k1", secret.as_bytes())])?;
//! let tokens = TokenService::new(keys, Arc::new(InMemoryRevocationStore::default()));
//!
//! let pair = tokens.issue_token_pair("alice", "alice@example.com").await?;
//! let claims = tokens.verify(&pair.access_token)?;
//! ```

use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode, errors::ErrorKind};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::claims::{Claims, TokenType};
use super::keys::{SigningKey, SigningKeys};
use super::revocation::RevocationStore;
use crate::config::AuthConfig;
use crate::error::{Result, TokenError, WardenError};

/// An access token and its refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens, and owns refresh-token registration.
#[derive(Clone)]
pub struct TokenService {
    keys: SigningKeys,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
    store: Arc<dyn RevocationStore>,
    validation: Validation,
}

impl TokenService {
    /// HS256 with the default lifetimes (1 hour access, 72 hours refresh).
    pub fn new(keys: SigningKeys, store: Arc<dyn RevocationStore>) -> Self {
        Self::with_settings(
            keys,
            store,
            Algorithm::HS256,
            Duration::from_secs(60 * 60),
            Duration::from_secs(72 * 60 * 60),
        )
    }

    pub fn from_config(config: &AuthConfig, store: Arc<dyn RevocationStore>) -> Result<Self> {
        let keys = SigningKeys::from_config(&config.signing_keys)?;
        Ok(Self::with_settings(
            keys,
            store,
            config.algorithm,
            Duration::from_secs(config.access_token_ttl),
            Duration::from_secs(config.refresh_token_ttl),
        ))
    }

    pub fn with_settings(
        keys: SigningKeys,
        store: Arc<dyn RevocationStore>,
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys,
            algorithm,
            access_ttl,
            refresh_ttl,
            store,
            validation,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn revocation_store(&self) -> &Arc<dyn RevocationStore> {
        &self.store
    }

    /// Sign claims with the active key.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let key = self.keys.active();
        let mut header = Header::new(self.algorithm);
        header.kid = Some(key.kid().to_string());

        encode(&header, claims, key.encoding())
            .map_err(|e| WardenError::signing(format!("Failed to sign token: {}", e)))
    }

    /// Mint an access/refresh pair and register the refresh token as live.
    ///
    /// Nothing is returned unless registration succeeded.
    pub async fn issue_token_pair(&self, username: &str, email: &str) -> Result<TokenPair> {
        let access = Claims::new(username, email, TokenType::Access, self.access_ttl.as_secs());
        let refresh = Claims::new(username, email, TokenType::Refresh, self.refresh_ttl.as_secs());

        let access_token = self.sign(&access)?;
        let refresh_token = self.sign(&refresh)?;

        self.store
            .set(&refresh_token, username, self.refresh_ttl)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Check signature, algorithm and expiry. Does not consult the store.
    ///
    /// The signature is checked before `exp`, so an expired token with a bad
    /// signature reports `InvalidSignature`. Both render as the same 401.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).map_err(|e| map_jwt_error(e.kind()))?;

        // Checked before any key is tried so a foreign algorithm never reaches decode
        if header.alg != self.algorithm {
            return Err(TokenError::InvalidSignature.into());
        }

        let named = header.kid.as_deref().and_then(|kid| self.keys.find(kid));
        match named {
            Some(key) => self.decode_with(token, key),
            None => {
                for key in self.keys.iter() {
                    match self.decode_with(token, key) {
                        Err(WardenError::Token(TokenError::InvalidSignature)) => continue,
                        other => return other,
                    }
                }
                Err(TokenError::InvalidSignature.into())
            }
        }
    }

    /// Verify a refresh token and require it to still be registered.
    pub async fn verify_refresh_liveness(&self, token: &str) -> Result<Claims> {
        let claims = self.verify(token)?;
        if !claims.is_refresh() {
            return Err(TokenError::MalformedClaims.into());
        }

        match self.store.get(token).await? {
            Some(_) => Ok(claims),
            None => Err(TokenError::Revoked.into()),
        }
    }

    /// Remove a refresh token from the store. Absent tokens are fine.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.store.del(token).await
    }

    fn decode_with(&self, token: &str, key: &SigningKey) -> Result<Claims> {
        decode::<Claims>(token, key.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| map_jwt_error(e.kind()))
    }
}

fn map_jwt_error(kind: &ErrorKind) -> WardenError {
    let reason = match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::MalformedClaims,
        _ => TokenError::Malformed,
    };
    reason.into()
}

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub email: String,
    /// Expiration time (unix timestamp, seconds)
    pub exp: u64,
    /// Issued at (unix timestamp, seconds)
    pub iat: u64,
    /// Random token id; keeps tokens minted in the same second distinct
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    pub(crate) fn new(username: &str, email: &str, token_type: TokenType, ttl_secs: u64) -> Self {
        let now = current_timestamp();
        Self {
            username: username.to_string(),
            email: email.to_string(),
            exp: now + ttl_secs,
            iat: now,
            jti: generate_jti(),
            token_type,
        }
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}

/// The authenticated caller, attached to request extensions by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            email: claims.email,
        }
    }
}

pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn generate_jti() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

//! Ordered HMAC key set with key-id based rotation.
//!
//! The first key signs new tokens and its id goes into the `kid` header.
//! Older keys stay in the set so tokens they signed keep verifying until
//! they expire.

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;

use crate::config::SigningKeyConfig;
use crate::error::{Result, WardenError};

/// A single named secret.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn new(kid: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            kid: kid.into(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct SigningKeys {
    keys: Vec<SigningKey>,
}

impl SigningKeys {
    /// Build a key set. Fails if it is empty or a key id repeats.
    pub fn new(keys: Vec<SigningKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(WardenError::internal("signing key set is empty"));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].iter().any(|k| k.kid == key.kid) {
                return Err(WardenError::internal(format!(
                    "duplicate signing key id: {}",
                    key.kid
                )));
            }
        }
        Ok(Self { keys })
    }

    pub fn from_config(keys: &[SigningKeyConfig]) -> Result<Self> {
        Self::new(
            keys.iter()
                .map(|k| SigningKey::new(&k.kid, k.secret.as_bytes()))
                .collect(),
        )
    }

    /// The key used for new signatures.
    pub fn active(&self) -> &SigningKey {
        &self.keys[0]
    }

    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SigningKey> {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_key_is_active() {
        let keys = SigningKeys::new(vec![
            SigningKey::new("k2", b"new-secret"),
            SigningKey::new("k1", b"old-secret"),
        ])
        .unwrap();
        assert_eq!(keys.active().kid(), "k2");
        assert!(keys.find("k1").is_some());
        assert!(keys.find("k3").is_none());
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(SigningKeys::new(vec![]).is_err());
        assert!(
            SigningKeys::new(vec![
                SigningKey::new("k1", b"a"),
                SigningKey::new("k1", b"b"),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::new("k1", b"super-secret-material");
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("k1"));
        assert!(!rendered.contains("super-secret"));
    }
}

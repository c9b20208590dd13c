//! Token lifecycle and the auth gate.

mod claims;
mod extractors;
pub mod flows;
mod gate;
mod keys;
pub mod password;
mod revocation;
mod token;
mod token_service;

pub use claims::{Claims, Identity, TokenType};
pub use extractors::CurrentUser;
pub use flows::{SessionFlow, SigninFlow, SignupFlow};
pub use gate::AuthGate;
pub use keys::{SigningKey, SigningKeys};
pub use password::{PasswordConfig, PasswordHasher, PasswordPolicy};
#[cfg(feature = "redis")]
pub use revocation::RedisRevocationStore;
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use token::TokenExtractor;
pub use token_service::{TokenPair, TokenService};

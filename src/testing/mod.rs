//! Testing utilities for warden
//!
//! - Alba-style HTTP endpoint testing without running a server
//! - A ready-made [`AppState`] with in-memory stores and cheap password hashing
//!
//! # Example
//!
//! ```rust,ignore
//! use warden::testing;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let app = warden::router(testing::test_state());
//!
//!     testing::get(app, "/health")
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_json();
//! }
//! ```

mod scenario;

pub use scenario::{Scenario, ScenarioAssert, delete, get, post, put};

use crate::app::AppState;
use crate::auth::PasswordConfig;
use crate::config::{AuthConfig, SigningKeyConfig};

/// Secret used by [`test_auth_config`]. Never use outside tests.
pub const TEST_SECRET: &str = "warden-test-secret-0123456789abcdef";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        signing_keys: vec![SigningKeyConfig {
            kid: "test".to_string(),
            secret: TEST_SECRET.to_string(),
        }],
        ..AuthConfig::default()
    }
}

/// In-memory state with fast Argon2 parameters.
///
/// # Panics
///
/// Panics if the test auth config is rejected, which would be a bug.
pub fn test_state() -> AppState {
    AppState::builder(test_auth_config())
        .with_password_config(PasswordConfig::fast())
        .build()
        .expect("test auth config is valid")
}

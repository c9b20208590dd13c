//! Warden - account and organization service
//!
//! Warden signs users up and in, hands out access/refresh JWT pairs, keeps
//! refresh tokens revocable through a TTL store, and serves organization
//! CRUD behind a bearer-token gate plus a per-organization invitation gate.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use warden::{App, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     warden::init_tracing_with_config(&config);
//!     App::from_config(config)?.serve().await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod auth;
mod config;
mod core;
mod error;
pub mod health;
mod http;
mod middleware;
pub mod organizations;
pub mod store;
pub mod testing;
mod utils;

pub use app::{AppState, AppStateBuilder};
pub use config::{
    AuthConfig, Config, ConfigBuilder, LoggingConfig, RefreshRotation, RevocationBackend,
    RevocationConfig, ServerConfig, SigningKeyConfig,
};
pub use core::App;
pub use error::{Result, TokenError, WardenError};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{
    CreatedOrganization, InviteRequest, JsonBody, OrganizationRequest, OrganizationView,
    ValidatedJson, auth_routes, organization_routes, router,
};
pub use middleware::{Interceptor, Interceptors};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "warden=debug")
/// - `WARDEN_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from `Config::logging`
///
/// The level comes from `WARDEN_LOG_LEVEL` (validated by `ConfigBuilder::build`)
/// rather than `RUST_LOG`.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = logging_filter(&config.logging);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn logging_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::new(&logging.level)
}

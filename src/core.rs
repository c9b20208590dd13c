use axum::{Router, http::StatusCode};
use std::time::Duration;
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    app::AppState,
    config::Config,
    error::{Result, WardenError},
    http,
};

/// The warden HTTP server
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    /// Build an app from configuration, opening the configured stores.
    pub fn from_config(config: Config) -> Result<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Use pre-built state, e.g. with custom stores.
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Full router with tracing and request timeout applied.
    pub fn router(&self) -> Router {
        // Layer order (outer to inner): trace, timeout, routes
        http::router(self.state.clone())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(self.config.timeout_seconds),
            ))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(self) -> Result<()> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| WardenError::bad_request(format!("Invalid server address: {}", e)))?;

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| WardenError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| WardenError::internal(format!("Server error: {}", e)))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::testing;

    #[tokio::test]
    async fn test_router_serves_health() {
        let config = ConfigBuilder::new()
            .with_signing_key("k1", testing::TEST_SECRET)
            .build()
            .unwrap();
        let app = App::with_state(config, testing::test_state());

        testing::get(app.router(), "/health")
            .execute()
            .await
            .assert_ok()
            .assert_json_path("status", serde_json::json!("healthy"))
            .await;
    }

    struct StalledStore;

    #[async_trait::async_trait]
    impl crate::auth::RevocationStore for StalledStore {
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn del(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_store_call_times_out() {
        let config = ConfigBuilder::new()
            .with_signing_key("k1", testing::TEST_SECRET)
            .with_timeout_seconds(1)
            .build()
            .unwrap();
        let state = AppState::builder(testing::test_auth_config())
            .with_password_config(crate::auth::PasswordConfig::fast())
            .with_revocation_store(std::sync::Arc::new(StalledStore))
            .build()
            .unwrap();
        let app = App::with_state(config, state);

        testing::post(app.router(), "/auth/signup")
            .json_body(&serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "hunter2hunter2",
            }))
            .execute()
            .await
            .assert_status(StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_from_config() {
        let config = ConfigBuilder::new()
            .with_signing_key("k1", testing::TEST_SECRET)
            .build()
            .unwrap();
        assert!(App::from_config(config).is_ok());
    }
}

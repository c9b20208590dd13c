use std::sync::Arc;

#[cfg(feature = "redis")]
use crate::auth::RedisRevocationStore;
use crate::auth::{
    InMemoryRevocationStore, PasswordConfig, PasswordHasher, PasswordPolicy, RevocationStore,
    SessionFlow, SigninFlow, SignupFlow, TokenService,
};
use crate::config::{
    AuthConfig, Config, RevocationBackend, RevocationConfig, check_password_min_length,
};
use crate::error::{Result, WardenError};
use crate::organizations::OrganizationService;
use crate::store::{InMemoryStore, OrganizationStore, UserStore};

/// Shared state handed to every handler.
///
/// Everything inside is cheap to clone; stores sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub signup: SignupFlow,
    pub signin: SigninFlow,
    pub sessions: SessionFlow,
    pub organizations: OrganizationService,
    pub tokens: TokenService,
    pub user_store: Arc<dyn UserStore>,
    pub organization_store: Arc<dyn OrganizationStore>,
}

impl AppState {
    pub fn builder(auth: AuthConfig) -> AppStateBuilder {
        AppStateBuilder::new(auth)
    }

    /// Build state from configuration, opening the configured revocation backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let revocation = revocation_store(&config.revocation)?;
        Self::builder(config.auth.clone())
            .with_revocation_store(revocation)
            .build()
    }
}

fn revocation_store(config: &RevocationConfig) -> Result<Arc<dyn RevocationStore>> {
    match config.backend {
        RevocationBackend::Memory => Ok(Arc::new(InMemoryRevocationStore::default())),
        #[cfg(feature = "redis")]
        RevocationBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                WardenError::bad_request("Redis revocation backend requires REDIS_URL")
            })?;
            tracing::info!(target: "warden.startup", "using redis revocation store");
            Ok(Arc::new(RedisRevocationStore::new(
                url,
                config.key_prefix.clone(),
            )?))
        }
        #[cfg(not(feature = "redis"))]
        RevocationBackend::Redis => Err(WardenError::bad_request(
            "Redis revocation backend requires the `redis` feature",
        )),
    }
}

/// Assembles [`AppState`], defaulting every store to its in-memory form.
pub struct AppStateBuilder {
    auth: AuthConfig,
    users: Option<Arc<dyn UserStore>>,
    organizations: Option<Arc<dyn OrganizationStore>>,
    revocation: Option<Arc<dyn RevocationStore>>,
    hasher: PasswordHasher,
}

impl AppStateBuilder {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            users: None,
            organizations: None,
            revocation: None,
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_user_store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.users = Some(store);
        self
    }

    pub fn with_organization_store(mut self, store: Arc<dyn OrganizationStore>) -> Self {
        self.organizations = Some(store);
        self
    }

    pub fn with_revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.revocation = Some(store);
        self
    }

    pub fn with_password_config(mut self, config: PasswordConfig) -> Self {
        self.hasher = PasswordHasher::new(config);
        self
    }

    pub fn build(self) -> Result<AppState> {
        // One in-memory store serves both roles unless overridden.
        let shared = InMemoryStore::new();
        let users = self
            .users
            .unwrap_or_else(|| Arc::new(shared.clone()) as Arc<dyn UserStore>);
        let organization_store = self
            .organizations
            .unwrap_or_else(|| Arc::new(shared) as Arc<dyn OrganizationStore>);
        let revocation = self
            .revocation
            .unwrap_or_else(|| Arc::new(InMemoryRevocationStore::default()));

        check_password_min_length(self.auth.password_min_length)?;
        let tokens = TokenService::from_config(&self.auth, revocation)?;
        let policy = PasswordPolicy::default().min_length(self.auth.password_min_length);

        Ok(AppState {
            signup: SignupFlow::new(users.clone(), tokens.clone())
                .with_policy(policy)
                .with_hasher(self.hasher.clone()),
            signin: SigninFlow::new(users.clone(), tokens.clone()).with_hasher(self.hasher),
            sessions: SessionFlow::new(tokens.clone())
                .with_rotation(self.auth.refresh_rotation),
            organizations: OrganizationService::new(organization_store.clone()),
            tokens,
            user_store: users,
            organization_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, SigningKeyConfig};

    fn auth_config() -> AuthConfig {
        AuthConfig {
            signing_keys: vec![SigningKeyConfig {
                kid: "k1".to_string(),
                secret: "0123456789abcdef0123456789abcdef".to_string(),
            }],
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_default_stores_are_shared() {
        let state = AppState::builder(auth_config())
            .with_password_config(PasswordConfig::fast())
            .build()
            .unwrap();

        assert_eq!(state.tokens.access_ttl().as_secs(), 3600);
        assert!(state.tokens.revocation_store().is_healthy().await);
        assert!(state.organization_store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_from_config_memory_backend() {
        let config = ConfigBuilder::new()
            .with_signing_key("k1", "0123456789abcdef0123456789abcdef")
            .build()
            .unwrap();
        assert!(AppState::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_short_password_floor_is_rejected() {
        let auth = AuthConfig {
            password_min_length: 4,
            ..auth_config()
        };
        assert!(AppState::builder(auth).build().is_err());

        let state = AppState::builder(auth_config())
            .with_password_config(PasswordConfig::fast())
            .build()
            .unwrap();
        let err = state
            .signup
            .signup(crate::auth::flows::SignupRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "abcde".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::Validation(_)));
    }

    #[test]
    fn test_missing_keys_fail() {
        let result = AppState::builder(AuthConfig::default()).build();
        assert!(result.is_err());
    }
}

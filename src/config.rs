use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{Result, WardenError};
use crate::utils::get_env_with_prefix;

/// Minimum length of an HMAC signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Lowest password minimum length a deployment may configure.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Main configuration for a warden service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub revocation: RevocationConfig,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// One named HMAC secret.
#[derive(Clone, Deserialize, Serialize)]
pub struct SigningKeyConfig {
    pub kid: String,
    #[serde(skip_serializing)]
    pub secret: String,
}

impl fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyConfig")
            .field("kid", &self.kid)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// What happens to a refresh token once it has been exchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshRotation {
    /// The presented token stays live until it expires or is revoked.
    #[default]
    Reusable,
    /// The presented token is revoked before the new pair is issued.
    SingleUse,
}

impl FromStr for RefreshRotation {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "reusable" => Ok(Self::Reusable),
            "single_use" => Ok(Self::SingleUse),
            other => Err(WardenError::bad_request(format!(
                "Invalid refresh rotation: {}. Must be one of: reusable, single_use",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Ordered key set; the first entry signs new tokens.
    #[serde(default)]
    pub signing_keys: Vec<SigningKeyConfig>,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 1 hour)
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl: u64,
    /// Refresh token lifetime in seconds (default: 72 hours)
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl: u64,
    #[serde(default)]
    pub refresh_rotation: RefreshRotation,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevocationConfig {
    #[serde(default)]
    pub backend: RevocationBackend,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            auth: AuthConfig::default(),
            revocation: RevocationConfig::default(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_keys: Vec::new(),
            algorithm: default_algorithm(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            refresh_rotation: RefreshRotation::default(),
            password_min_length: default_password_min_length(),
        }
    }
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackend::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

fn default_access_ttl() -> u64 {
    60 * 60
}

fn default_refresh_ttl() -> u64 {
    72 * 60 * 60
}

fn default_password_min_length() -> usize {
    8
}

fn default_key_prefix() -> String {
    "warden:refresh:".to_string()
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Deployments may raise the password floor but never lower it.
pub(crate) fn check_password_min_length(len: usize) -> Result<()> {
    if len < MIN_PASSWORD_LENGTH {
        return Err(WardenError::bad_request(format!(
            "Password minimum length must be at least {}, got {}",
            MIN_PASSWORD_LENGTH, len
        )));
    }
    Ok(())
}

/// Parse `kid=secret,kid=secret`. An entry without `=` gets a positional kid.
fn parse_signing_keys(raw: &str) -> Vec<SigningKeyConfig> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(i, entry)| match entry.split_once('=') {
            Some((kid, secret)) => SigningKeyConfig {
                kid: kid.trim().to_string(),
                secret: secret.trim().to_string(),
            },
            None => SigningKeyConfig {
                kid: format!("key{}", i),
                secret: entry.to_string(),
            },
        })
        .collect()
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Append a signing key. The first key added signs new tokens.
    pub fn with_signing_key(mut self, kid: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.auth.signing_keys.push(SigningKeyConfig {
            kid: kid.into(),
            secret: secret.into(),
        });
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.auth.algorithm = algorithm;
        self
    }

    pub fn with_access_token_ttl(mut self, seconds: u64) -> Self {
        self.config.auth.access_token_ttl = seconds;
        self
    }

    pub fn with_refresh_token_ttl(mut self, seconds: u64) -> Self {
        self.config.auth.refresh_token_ttl = seconds;
        self
    }

    pub fn with_refresh_rotation(mut self, rotation: RefreshRotation) -> Self {
        self.config.auth.refresh_rotation = rotation;
        self
    }

    pub fn with_password_min_length(mut self, len: usize) -> Self {
        self.config.auth.password_min_length = len;
        self
    }

    pub fn with_redis_revocation(mut self, url: impl Into<String>) -> Self {
        self.config.revocation.backend = RevocationBackend::Redis;
        self.config.revocation.redis_url = Some(url.into());
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = seconds;
        self
    }

    /// Load configuration from environment variables with WARDEN_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        // Falls back to PORT for platforms that inject it
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(keys) = get_env_with_prefix("SIGNING_KEYS") {
            self.config.auth.signing_keys = parse_signing_keys(&keys);
        }
        if let Some(alg) = get_env_with_prefix("JWT_ALGORITHM") {
            if let Ok(a) = alg.parse() {
                self.config.auth.algorithm = a;
            }
        }
        if let Some(ttl) = get_env_with_prefix("ACCESS_TOKEN_TTL") {
            if let Ok(t) = ttl.parse() {
                self.config.auth.access_token_ttl = t;
            }
        }
        if let Some(ttl) = get_env_with_prefix("REFRESH_TOKEN_TTL") {
            if let Ok(t) = ttl.parse() {
                self.config.auth.refresh_token_ttl = t;
            }
        }
        if let Some(rotation) = get_env_with_prefix("REFRESH_ROTATION") {
            if let Ok(r) = rotation.parse() {
                self.config.auth.refresh_rotation = r;
            }
        }
        if let Some(len) = get_env_with_prefix("PASSWORD_MIN_LENGTH") {
            if let Ok(l) = len.parse() {
                self.config.auth.password_min_length = l;
            }
        }
        if let Some(url) = get_env_with_prefix("REDIS_URL") {
            self.config.revocation.redis_url = Some(url);
        }
        if let Some(backend) = get_env_with_prefix("REVOCATION_BACKEND") {
            match backend.to_ascii_lowercase().as_str() {
                "redis" => self.config.revocation.backend = RevocationBackend::Redis,
                "memory" => self.config.revocation.backend = RevocationBackend::Memory,
                _ => {}
            }
        }
        if let Some(prefix) = get_env_with_prefix("REVOCATION_KEY_PREFIX") {
            self.config.revocation.key_prefix = prefix;
        }
        if let Some(timeout) = get_env_with_prefix("TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse() {
                self.config.timeout_seconds = t;
            }
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address (host:port)
    /// - Invalid log level
    /// - Missing, short or duplicate signing keys
    /// - Non-HMAC algorithm
    /// - Token lifetimes that are zero or out of order
    /// - Redis backend selected without a URL
    pub fn build(self) -> Result<Config> {
        let config = self.config;

        config.server.addr().map_err(|e| {
            WardenError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                config.server.host, config.server.port, e
            ))
        })?;

        if config.server.port == 0 {
            return Err(WardenError::bad_request("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(WardenError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let auth = &config.auth;
        if auth.signing_keys.is_empty() {
            return Err(WardenError::bad_request(
                "At least one signing key is required (WARDEN_SIGNING_KEYS)",
            ));
        }
        for (i, key) in auth.signing_keys.iter().enumerate() {
            if key.kid.is_empty() {
                return Err(WardenError::bad_request("Signing key id must not be empty"));
            }
            if key.secret.len() < MIN_SECRET_LEN {
                return Err(WardenError::bad_request(format!(
                    "Signing key '{}' must be at least {} bytes",
                    key.kid, MIN_SECRET_LEN
                )));
            }
            if auth.signing_keys[..i].iter().any(|k| k.kid == key.kid) {
                return Err(WardenError::bad_request(format!(
                    "Duplicate signing key id: {}",
                    key.kid
                )));
            }
        }

        if !matches!(
            auth.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(WardenError::bad_request(format!(
                "Unsupported signing algorithm {:?}. Must be one of: HS256, HS384, HS512",
                auth.algorithm
            )));
        }

        if auth.access_token_ttl == 0 || auth.refresh_token_ttl == 0 {
            return Err(WardenError::bad_request(
                "Token lifetimes must be greater than 0",
            ));
        }
        if auth.refresh_token_ttl <= auth.access_token_ttl {
            return Err(WardenError::bad_request(
                "Refresh token lifetime must exceed access token lifetime",
            ));
        }

        check_password_min_length(auth.password_min_length)?;

        if config.revocation.backend == RevocationBackend::Redis
            && config
                .revocation
                .redis_url
                .as_deref()
                .is_none_or(str::is_empty)
        {
            return Err(WardenError::bad_request(
                "Redis revocation backend requires WARDEN_REDIS_URL",
            ));
        }

        if config.timeout_seconds == 0 {
            return Err(WardenError::bad_request(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "an-adequately-long-signing-secret-value";

    #[test]
    fn test_defaults() {
        let config = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .build()
            .unwrap();

        assert_eq!(config.auth.access_token_ttl, 3600);
        assert_eq!(config.auth.refresh_token_ttl, 259_200);
        assert_eq!(config.auth.algorithm, Algorithm::HS256);
        assert_eq!(config.auth.refresh_rotation, RefreshRotation::Reusable);
        assert_eq!(config.auth.password_min_length, 8);
        assert_eq!(config.revocation.backend, RevocationBackend::Memory);
    }

    #[test]
    fn test_requires_signing_key() {
        assert!(ConfigBuilder::new().build().is_err());
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = ConfigBuilder::new().with_signing_key("k1", "short").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_kid() {
        let result = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_signing_key("k1", SECRET)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_asymmetric_algorithm() {
        let result = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_algorithm(Algorithm::RS256)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let result = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_access_token_ttl(600)
            .with_refresh_token_ttl(600)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_password_floor_cannot_be_lowered() {
        for len in [0, 4, 7] {
            let result = ConfigBuilder::new()
                .with_signing_key("k1", SECRET)
                .with_password_min_length(len)
                .build();
            assert!(result.is_err(), "min length {} was accepted", len);
        }

        let config = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_password_min_length(12)
            .build()
            .unwrap();
        assert_eq!(config.auth.password_min_length, 12);
    }

    #[test]
    fn test_redis_requires_url() {
        let mut builder = ConfigBuilder::new().with_signing_key("k1", SECRET);
        builder.config.revocation.backend = RevocationBackend::Redis;
        assert!(builder.build().is_err());

        let config = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_redis_revocation("redis://127.0.0.1:6379")
            .build()
            .unwrap();
        assert_eq!(config.revocation.backend, RevocationBackend::Redis);
    }

    #[test]
    fn test_invalid_log_level() {
        let result = ConfigBuilder::new()
            .with_signing_key("k1", SECRET)
            .with_log_level("loud")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_signing_keys() {
        let keys = parse_signing_keys("k2=newsecret, k1=oldsecret,,bare");
        let kids: Vec<&str> = keys.iter().map(|k| k.kid.as_str()).collect();
        assert_eq!(kids, vec!["k2", "k1", "key2"]);
        assert_eq!(keys[0].secret, "newsecret");
        assert_eq!(keys[2].secret, "bare");
    }

    #[test]
    fn test_refresh_rotation_from_str() {
        assert_eq!(
            "single-use".parse::<RefreshRotation>().unwrap(),
            RefreshRotation::SingleUse
        );
        assert_eq!(
            "Reusable".parse::<RefreshRotation>().unwrap(),
            RefreshRotation::Reusable
        );
        assert!("sometimes".parse::<RefreshRotation>().is_err());
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let key = SigningKeyConfig {
            kid: "k1".into(),
            secret: SECRET.into(),
        };
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("REDACTED"));
    }
}

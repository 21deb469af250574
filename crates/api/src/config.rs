use serde::Deserialize;
use shared::jwt::MIN_SECRET_LEN;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    /// First admin account created on startup
    #[serde(default)]
    pub admin: AdminBootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per authenticated user; 0 disables the limiter
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret for HS256 signing, at least 32 bytes
    pub secret: String,

    /// Token lifetime in seconds (default: 86400 = 24 hours)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminBootstrapConfig {
    #[serde(default)]
    pub bootstrap_username: String,

    #[serde(default)]
    pub bootstrap_email: String,

    #[serde(default)]
    pub bootstrap_password: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    100
}
fn default_token_expiry() -> i64 {
    shared::jwt::DEFAULT_TOKEN_EXPIRY_SECS
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with INV__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("INV").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults so tests never touch config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 100

            [jwt]
            secret = "test-secret-with-at-least-thirty-two-bytes"
            token_expiry_secs = 86400
            leeway_secs = 30

            [admin]
            bootstrap_username = ""
            bootstrap_email = ""
            bootstrap_password = ""
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so partial configs can be inspected
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "INV__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "INV__JWT__SECRET environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if self.jwt.token_expiry_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "jwt.token_expiry_secs must be positive".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

use serde::Deserialize;
use std::net::SocketAddr;

use domain::models::PlanPricing;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Public URL of the site, used for checkout redirects and the webhook URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
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
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Adds `Secure` to the admin session cookie.
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,

    /// Per-client attempts on the password endpoints; 0 disables the limiter.
    #[serde(default = "default_login_attempts")]
    pub login_attempts_per_minute: u32,

    /// Sends Strict-Transport-Security; enable only behind TLS.
    #[serde(default)]
    pub hsts_enabled: bool,

    /// Keys the password limiter on `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe when a reverse proxy overwrites those headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cookie_secure: default_cookie_secure(),
            login_attempts_per_minute: default_login_attempts(),
            hsts_enabled: false,
            trust_proxy_headers: false,
        }
    }
}

/// Platform admin credential and signing material.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_password: String,

    #[serde(default)]
    pub session_secret: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    #[serde(default = "default_event_token_ttl")]
    pub event_token_ttl_secs: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_password", &"[REDACTED]")
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("event_token_ttl_secs", &self.event_token_ttl_secs)
            .finish()
    }
}

/// Checkout provider (MercadoPago) settings.
#[derive(Clone, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_payments_api_base")]
    pub api_base_url: String,

    #[serde(default = "default_standard_price")]
    pub standard_price: i64,

    #[serde(default = "default_premium_price")]
    pub premium_price: i64,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl PaymentsConfig {
    pub fn pricing(&self) -> PlanPricing {
        PlanPricing {
            standard: self.standard_price,
            premium: self.premium_price,
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_base_url: default_payments_api_base(),
            standard_price: default_standard_price(),
            premium_price: default_premium_price(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("access_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("standard_price", &self.standard_price)
            .field("premium_price", &self.premium_price)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .finish()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
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
fn default_cookie_secure() -> bool {
    true
}
fn default_login_attempts() -> u32 {
    10
}
fn default_session_ttl() -> i64 {
    shared::jwt::DEFAULT_SESSION_EXPIRY_SECS
}
fn default_event_token_ttl() -> i64 {
    shared::access_token::DEFAULT_EVENT_TOKEN_TTL_SECS
}
fn default_payments_api_base() -> String {
    "https://api.mercadopago.com".to_string()
}
fn default_standard_price() -> i64 {
    PlanPricing::default().standard
}
fn default_premium_price() -> i64 {
    PlanPricing::default().premium
}
fn default_provider_timeout() -> u64 {
    10
}

/// Upper bound for session and event token lifetimes (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

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
    /// 3. Environment variables with RSVP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RSVP").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            base_url = "http://localhost:3000"

            [database]
            url = ""
            max_connections = 20
            min_connections = 2
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            cookie_secure = true
            login_attempts_per_minute = 10
            hsts_enabled = false
            trust_proxy_headers = false

            [auth]
            admin_password = ""
            session_secret = ""

            [payments]
            access_token = ""
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.auth.admin_password.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__AUTH__ADMIN_PASSWORD environment variable must be set".to_string(),
            ));
        }

        if self.auth.session_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__AUTH__SESSION_SECRET environment variable must be set".to_string(),
            ));
        }

        if self.auth.admin_password == self.auth.session_secret {
            return Err(ConfigValidationError::InvalidValue(
                "admin_password and session_secret must be different values".to_string(),
            ));
        }

        for (name, ttl) in [
            ("auth.session_ttl_secs", self.auth.session_ttl_secs),
            ("auth.event_token_ttl_secs", self.auth.event_token_ttl_secs),
        ] {
            if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "{} must be between 1 and {} seconds",
                    name, MAX_TOKEN_TTL_SECS
                )));
            }
        }

        if self.payments.standard_price <= 0 || self.payments.premium_price <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "plan prices must be positive".to_string(),
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

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}

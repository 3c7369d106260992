use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::assistant::SelectorPolicy;
use crate::auth::AuthConfig;
use crate::services::ChatSettings;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_JWT_EXPIRATION_SECS: u64 = 86_400;
const DEFAULT_MAX_MESSAGE_LENGTH: usize = 1000;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str =
    "storefront_development_signing_key_not_for_production_use_Qm8vXr2TzL7wNp4K";

/// Shopping assistant tuning
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Maximum number of products attached to a reply
    #[serde(default = "default_recommendation_limit")]
    #[validate(range(min = 1, max = 20))]
    pub recommendation_limit: usize,

    /// Budget picks cost strictly less than this
    #[serde(
        default = "default_budget_threshold",
        with = "rust_decimal::serde::float"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub budget_threshold: Decimal,

    /// Premium picks cost strictly more than this
    #[serde(
        default = "default_premium_threshold",
        with = "rust_decimal::serde::float"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub premium_threshold: Decimal,

    /// Minimum rating for the popular-products fallback
    #[serde(default = "default_popular_rating_threshold")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub popular_rating_threshold: f64,

    /// Fail a turn that names an unknown conversation instead of starting a new one
    #[serde(default)]
    pub reject_unknown_conversation_id: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            recommendation_limit: default_recommendation_limit(),
            budget_threshold: default_budget_threshold(),
            premium_threshold: default_premium_threshold(),
            popular_rating_threshold: default_popular_rating_threshold(),
            reject_unknown_conversation_id: false,
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// JWT signing secret
    #[validate(custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT lifetime in seconds (5min - 30d)
    #[serde(default = "default_jwt_expiration")]
    #[validate(range(min = 300, max = 2_592_000))]
    pub jwt_expiration: u64,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Maximum chat message length in characters
    #[serde(default = "default_max_message_length")]
    #[validate(range(min = 1, max = 10_000))]
    pub max_message_length: usize,

    /// Load the demo catalog on startup
    #[serde(default = "default_true_bool")]
    pub seed_catalog: bool,

    /// Shopping assistant settings
    #[serde(default)]
    #[validate]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Development configuration with built-in defaults
    pub fn development() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            jwt_secret: DEV_DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration: default_jwt_expiration(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            max_message_length: default_max_message_length(),
            seed_catalog: true,
            chat: ChatConfig::default(),
        }
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Explicitly configured CORS origins, empty entries dropped
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        !self.cors_origins().is_empty()
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn selector_policy(&self) -> SelectorPolicy {
        SelectorPolicy {
            limit: self.chat.recommendation_limit,
            budget_threshold: self.chat.budget_threshold,
            premium_threshold: self.chat.premium_threshold,
            popular_rating_threshold: self.chat.popular_rating_threshold,
        }
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            max_message_length: self.max_message_length,
            reject_unknown_conversation_id: self.chat.reject_unknown_conversation_id,
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(
            self.jwt_secret.clone(),
            Duration::from_secs(self.jwt_expiration),
        )
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if !self.is_development() && self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET {
            let mut err = ValidationError::new("jwt_secret_default_dev");
            err.message = Some(
                "The bundled development JWT secret must not be used outside development. Set APP__JWT_SECRET to a unique, secure value."
                    .into(),
            );
            errors.add("jwt_secret", err);
        }

        if self.chat.budget_threshold > self.chat.premium_threshold {
            let mut err = ValidationError::new("chat_thresholds");
            err.message =
                Some("chat.budget_threshold must not exceed chat.premium_threshold".into());
            errors.add("chat", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

fn default_true_bool() -> bool {
    true
}

fn default_recommendation_limit() -> usize {
    3
}

fn default_budget_threshold() -> Decimal {
    Decimal::from(100)
}

fn default_premium_threshold() -> Decimal {
    Decimal::from(500)
}

fn default_popular_rating_threshold() -> f64 {
    4.5
}

fn validate_non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Threshold must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 32 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 32 characters".into());
        return Err(err);
    }

    // Reject known insecure placeholders, including the old storefront default
    const DISALLOWED: [&str; 3] = [
        "your-secret-key-change-in-production",
        "your-secret-key",
        "default-secret-key",
    ];
    if DISALLOWED
        .iter()
        .any(|&bad| trimmed.eq_ignore_ascii_case(bad))
    {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be overridden with a secure random value".into());
        return Err(err);
    }

    let lower = trimmed.to_ascii_lowercase();
    let weak_fragments = ["changeme", "password", "12345", "abcdef"];
    if weak_fragments.iter().any(|pattern| lower.contains(pattern)) {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some(
            "JWT secret appears to be weak; use a cryptographically strong random string".into(),
        );
        return Err(err);
    }

    let unique_chars: std::collections::HashSet<char> = trimmed.chars().collect();
    if unique_chars.len() < 10 {
        let mut err = ValidationError::new("jwt_secret");
        err.message =
            Some("JWT secret must have at least 10 unique characters for adequate entropy".into());
        return Err(err);
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("storefront_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Loads configuration from `dir`, using `run_env` to pick the profile file.
pub fn load_config_from(dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

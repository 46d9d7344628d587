//! Type-Safe Configuration with Validation
//!
//! All deployment parameters come from the environment; nothing is a source
//! literal. Changing environments means changing variables, not code.

use std::env;
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable name
        field: String,
        /// Parse failure description
        reason: String,
    },

    /// Invalid port number
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// Invalid TTL or timeout value
    #[error("Invalid {0}: must be greater than 0")]
    InvalidDuration(&'static str),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parse failure description
        reason: String,
    },
}

/// Service configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port (1-65535)
    pub port: u16,
    /// Identity provider hosted-login domain
    pub login_domain: String,
    /// Identity pool identifier
    pub user_pool_id: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Identity provider region
    pub region: String,
    /// Post-login redirect URI
    pub redirect_uri: Url,
    /// Scopes requested on the login redirect
    pub login_scopes: Vec<String>,
    /// Cookie name carrying the identity token
    pub token_cookie: String,
    /// Expected issuer URL (derived from region and pool unless overridden)
    pub issuer_url: Url,
    /// JWKS endpoint URL (derived from the issuer unless overridden)
    pub jwks_url: Url,
    /// Signing-key cache TTL in seconds (must be > 0)
    pub jwks_cache_ttl_seconds: u64,
    /// Key-fetch HTTP timeout in seconds (must be > 0)
    pub key_fetch_timeout_secs: u64,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Emit JSON-formatted logs
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let region = require_env("IDP_REGION")?;
        let user_pool_id = require_env("IDP_USER_POOL_ID")?;

        let default_issuer = format!(
            "https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"
        );
        let issuer_url = parse_url_env("ISSUER_URL", &default_issuer)?;

        let redirect_uri_str = require_env("REDIRECT_URI")?;
        let redirect_uri = Url::parse(&redirect_uri_str).map_err(|e| ConfigError::InvalidUrl {
            field: "REDIRECT_URI".to_string(),
            reason: e.to_string(),
        })?;

        let default_jwks = format!(
            "{}/.well-known/jwks.json",
            issuer_url.as_str().trim_end_matches('/')
        );
        let jwks_url = parse_url_env("JWKS_URL", &default_jwks)?;

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8080)?,
            login_domain: require_env("IDP_LOGIN_DOMAIN")?,
            user_pool_id,
            client_id: require_env("IDP_CLIENT_ID")?,
            region,
            redirect_uri,
            login_scopes: parse_list_env("LOGIN_SCOPES", &["email", "openid", "profile"]),
            token_cookie: env::var("TOKEN_COOKIE").unwrap_or_else(|_| "id_token".to_string()),
            issuer_url,
            jwks_url,
            jwks_cache_ttl_seconds: parse_env("JWKS_CACHE_TTL", 300)?,
            key_fetch_timeout_secs: parse_env("KEY_FETCH_TIMEOUT", 10)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", 30)?,
            log_json: parse_env("LOG_JSON", true)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.jwks_cache_ttl_seconds == 0 {
            return Err(ConfigError::InvalidDuration("JWKS_CACHE_TTL"));
        }
        if self.key_fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration("KEY_FETCH_TIMEOUT"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidDuration("REQUEST_TIMEOUT"));
        }
        if self.login_domain.is_empty() {
            return Err(ConfigError::MissingRequired("login_domain".to_string()));
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::MissingRequired("client_id".to_string()));
        }
        if self.token_cookie.is_empty() {
            return Err(ConfigError::MissingRequired("token_cookie".to_string()));
        }
        if self.login_scopes.is_empty() {
            return Err(ConfigError::MissingRequired("login_scopes".to_string()));
        }
        Ok(())
    }

    /// Gets the expected issuer as a string, without a trailing slash.
    #[must_use]
    pub fn issuer_str(&self) -> &str {
        self.issuer_url.as_str().trim_end_matches('/')
    }

    /// Gets the JWKS URL as a string.
    #[must_use]
    pub fn jwks_url_str(&self) -> &str {
        self.jwks_url.as_str()
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read a required environment variable.
fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(name.to_string()))
}

/// Parse a URL environment variable with a default value.
fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a comma-separated list environment variable.
fn parse_list_env(name: &str, default: &[&str]) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| default.iter().map(|s| s.to_string()).collect())
}

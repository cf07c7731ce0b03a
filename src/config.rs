use std::env;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub carrier: CarrierConfig,
}

/// Credentials and tuning for the Bosta client. Credentials are opaque
/// strings supplied by the environment; this layer never inspects them.
#[derive(Debug, Clone)]
pub struct CarrierConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    /// Optional long-lived API key. When set, it is used as a static bearer
    /// token and the login endpoint is never called.
    pub api_key: Option<String>,
    /// Callback URL registered on each created delivery, if any.
    pub webhook_url: Option<String>,
    pub request_timeout_secs: u64,
    pub token_ttl_secs: u64,
}

const DEFAULT_BASE_URL: &str = "https://app.bosta.co/api/v2";

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            carrier: CarrierConfig {
                base_url: env::var("BOSTA_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                email: require("BOSTA_EMAIL")?,
                password: require("BOSTA_PASSWORD")?,
                api_key: env::var("BOSTA_API_KEY").ok().filter(|v| !v.is_empty()),
                webhook_url: env::var("BOSTA_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
                request_timeout_secs: parse_or_default("CARRIER_TIMEOUT_SECS", 30)?,
                token_ttl_secs: parse_or_default("TOKEN_TTL_SECS", 3600)?,
            },
        })
    }
}

fn require(key: &str) -> Result<String, ApiError> {
    env::var(key).map_err(|_| ApiError::Internal(format!("missing required env var {key}")))
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, ApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| ApiError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

//! Configuration types, read once from the environment at startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Fixed Comtele send endpoint.
pub const COMTELE_URL: &str = "https://sms.comtele.com.br/api/v2/send";

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3001;

/// Requests per dispatch group.
pub const DEFAULT_GROUP_SIZE: usize = 10;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Messaging provider configuration handed to the gateway adapter.
#[derive(Debug, Clone)]
pub struct ComteleConfig {
    /// `None` when `COMTELE_AUTH_KEY` is unset; sends then fail fast.
    pub auth_key: Option<SecretString>,
    pub url: String,
    /// Transport timeout per request.
    pub timeout: Duration,
    /// Treat a 2xx response whose body is not JSON as a failure.
    pub strict_responses: bool,
}

impl ComteleConfig {
    pub fn new(auth_key: Option<SecretString>) -> Self {
        Self {
            auth_key,
            url: COMTELE_URL.to_string(),
            timeout: Duration::from_secs(30),
            strict_responses: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Generative-text proxy configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
}

/// Whole-application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub group_size: usize,
    pub comtele: ComteleConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("expected a port number, got {raw:?}"),
            })?,
            None => DEFAULT_PORT,
        };

        // Zero still means one request at a time.
        let group_size = non_empty("DISPATCH_GROUP_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .map_or(DEFAULT_GROUP_SIZE, |n| n.max(1));

        let timeout_secs: u64 = non_empty("COMTELE_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let strict_responses = non_empty("COMTELE_STRICT_RESPONSES")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let comtele = ComteleConfig {
            auth_key: non_empty("COMTELE_AUTH_KEY").map(SecretString::from),
            url: non_empty("COMTELE_API_URL").unwrap_or_else(|| COMTELE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            strict_responses,
        };

        let gemini = GeminiConfig {
            api_key: non_empty("GEMINI_API_KEY").map(SecretString::from),
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        };

        Ok(Self {
            bind_address: non_empty("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            group_size,
            comtele,
            gemini,
        })
    }
}

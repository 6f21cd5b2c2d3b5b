//! Configuration types and loading
//!
//! Connection settings for the remote GraphQL endpoint.

use serde::{Deserialize, Serialize};

/// Path of the GraphQL endpoint below the instance URL
pub const GRAPHQL_PATH: &str = "/api/graphql";

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SonarConfig {
    /// Instance base URL (e.g. https://example.sonar.software)
    pub url: String,
    /// Personal access token sent as a bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Page size used when the caller does not pick one
    pub default_per_page: u32,
    pub user_agent: String,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            default_per_page: 25,
            user_agent: format!("sonar-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl SonarConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.url = lookup("SONAR_URL").ok_or_else(|| ConfigError::MissingEnvVar("SONAR_URL".into()))?;
        config.api_key = lookup("SONAR_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("SONAR_API_KEY".into()))?;

        if let Some(v) = lookup("SONAR_TIMEOUT_SECONDS") {
            config.timeout_seconds = parse_number("SONAR_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("SONAR_DEFAULT_PER_PAGE") {
            config.default_per_page = parse_number("SONAR_DEFAULT_PER_PAGE", &v)?;
        }
        if let Some(agent) = lookup("SONAR_USER_AGENT") {
            config.user_agent = agent;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidValue {
            key: "SONAR_URL".into(),
            message: e.to_string(),
        })?;
        if self.default_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SONAR_DEFAULT_PER_PAGE".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Full URL of the GraphQL endpoint
    pub fn graphql_endpoint(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), GRAPHQL_PATH)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

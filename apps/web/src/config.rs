use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if `MATCHING_API_URL` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the matching API, e.g. `https://ai.example.com/api/v1`.
    pub matching_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    /// Lifetime of error banners and notifications.
    pub notification_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            matching_api_url: require_env("MATCHING_API_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 60)?),
            notification_ttl: Duration::from_millis(parse_env("NOTIFICATION_TTL_MS", 5000)?),
            max_sessions: parse_env("MAX_SESSIONS", 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("JOBCONNECT_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("JOBCONNECT_TEST_BAD_TTL", "soon");
        let result: Result<u64> = parse_env("JOBCONNECT_TEST_BAD_TTL", 5000);
        assert!(result.is_err());
    }
}

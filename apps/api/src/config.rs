use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Nothing is required at startup: a missing model key only fails the
/// Generate endpoint, and a missing Redis URL selects the in-memory store.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            redis_url: optional("REDIS_URL"),
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "  "),
            ("REDIS_URL", ""),
        ]))
        .unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_reads_all_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("PORT", "3001"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.port, 3001);
        assert_eq!(config.rust_log, "debug");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).is_err());
    }
}

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::benchmark_cache::CacheSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    TwelveData,
    Multi,
}

impl FromStr for ProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "twelvedata" => Ok(ProviderKind::TwelveData),
            "multi" => Ok(ProviderKind::Multi),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub price_provider: ProviderKind,
    pub twelvedata_api_key: Option<String>,
    pub cache: CacheSettings,
    pub fx_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CacheSettings::default();

        let cache = CacheSettings {
            chunk_years: parse_or(&lookup, "CHUNK_YEARS", defaults.chunk_years)?,
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )?),
            max_retries: parse_or(&lookup, "FETCH_MAX_RETRIES", defaults.max_retries)?,
            retry_base_delay: defaults.retry_base_delay,
        };
        if cache.chunk_years == 0 {
            return Err(ConfigError::Invalid { key: "CHUNK_YEARS", value: "0".into() });
        }
        if cache.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid { key: "FETCH_TIMEOUT_SECS", value: "0".into() });
        }

        let price_provider = match lookup("PRICE_PROVIDER") {
            Some(value) => value
                .parse::<ProviderKind>()
                .map_err(|_| ConfigError::Invalid { key: "PRICE_PROVIDER", value })?,
            None => ProviderKind::Yahoo,
        };

        let twelvedata_api_key = lookup("TWELVEDATA_API_KEY").filter(|k| !k.is_empty());
        if price_provider != ProviderKind::Yahoo && twelvedata_api_key.is_none() {
            return Err(ConfigError::Missing("TWELVEDATA_API_KEY"));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|u| !u.is_empty()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            price_provider,
            twelvedata_api_key,
            cache,
            fx_ttl: Duration::from_secs(parse_or(&lookup, "FX_TTL_SECS", 3600)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.price_provider, ProviderKind::Yahoo);
        assert_eq!(config.cache.chunk_years, 5);
        assert_eq!(config.cache.fetch_timeout, Duration::from_secs(20));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.fx_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = config_from(&[("FETCH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FETCH_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_zero_chunk_years_is_rejected() {
        assert!(config_from(&[("CHUNK_YEARS", "0")]).is_err());
    }

    #[test]
    fn test_twelvedata_requires_key() {
        let err = config_from(&[("PRICE_PROVIDER", "twelvedata")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TWELVEDATA_API_KEY")));

        let config = config_from(&[("PRICE_PROVIDER", "Multi"), ("TWELVEDATA_API_KEY", "k")]).unwrap();
        assert_eq!(config.price_provider, ProviderKind::Multi);
    }
}

// src/config.rs
use std::env;
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;

pub const DEFAULT_FEED_URL: &str =
    "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/pages/xml";

#[derive(Debug, Error)]
#[error("{name} must be a number, got {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub feed_url: String,
    pub feed_timeout: Duration,
    pub feed_max_redirects: usize,
    pub cache_max_entries: usize,
    pub cors_origin: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            port: 3001,
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_timeout: Duration::from_secs(10),
            feed_max_redirects: 3,
            // 111 plausible years x 13 keys each, with headroom
            cache_max_entries: 2048,
            cors_origin: None,
        }
    }
}

impl ServiceConfig {
    /// Builds the config from the process environment. Call `dotenv().ok()` first
    /// if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let port = match lookup("PORT") {
            Some(v) => parse_num("PORT", v)?,
            None => {
                warn!("$PORT not set, defaulting to {}", defaults.port);
                defaults.port
            }
        };

        let feed_url = lookup("TREASURY_FEED_URL").unwrap_or(defaults.feed_url);

        let feed_timeout = match lookup("FEED_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_num("FEED_TIMEOUT_SECS", v)?),
            None => defaults.feed_timeout,
        };

        let feed_max_redirects = match lookup("FEED_MAX_REDIRECTS") {
            Some(v) => parse_num("FEED_MAX_REDIRECTS", v)?,
            None => defaults.feed_max_redirects,
        };

        let cache_max_entries = match lookup("YIELDS_CACHE_MAX_ENTRIES") {
            Some(v) => parse_num("YIELDS_CACHE_MAX_ENTRIES", v)?,
            None => defaults.cache_max_entries,
        };

        let cors_origin = lookup("CORS_ORIGIN").filter(|v| !v.trim().is_empty());

        let config = ServiceConfig {
            port,
            feed_url,
            feed_timeout,
            feed_max_redirects,
            cache_max_entries,
            cors_origin,
        };
        info!("Loaded config: {:?}", config);
        Ok(config)
    }
}

fn parse_num<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError { name, value })
}

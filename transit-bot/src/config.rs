//! Process configuration, read from `TRANSIT_*` environment variables.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::{BuildRules, CatalogCacheConfig, CatalogClientConfig};
use crate::domain::Mode;
use crate::live::LiveConfig;
use crate::pending::PendingConfig;

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bind_addr: SocketAddr,

    /// Catalog client settings (base URL, key, timeout).
    pub catalog: CatalogClientConfig,

    /// Live adapter settings (base URL, key, timeout).
    pub live: LiveConfig,

    /// Directory for the catalog feed cache.
    pub data_dir: PathBuf,

    /// The user store document.
    pub store_path: PathBuf,

    /// Directory for the suggestion and report logs.
    pub feedback_dir: PathBuf,

    /// How often every catalog is refetched.
    pub refresh_interval: Duration,

    pub pending: PendingConfig,

    /// Metro lines hidden from line browsing.
    pub metro_banned_lines: Vec<String>,

    /// Link offered by `/donar`, if any.
    pub donate_url: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            catalog: CatalogClientConfig::default(),
            live: LiveConfig::default(),
            data_dir: PathBuf::from("data"),
            store_path: PathBuf::from("data/users.json"),
            feedback_dir: PathBuf::from("."),
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            pending: PendingConfig::default(),
            metro_banned_lines: Vec::new(),
            donate_url: None,
        }
    }
}

impl BotConfig {
    /// Read the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("TRANSIT_BIND_ADDR") {
            config.bind_addr = parse("TRANSIT_BIND_ADDR", &addr)?;
        }
        if let Some(url) = get("TRANSIT_CATALOG_URL") {
            config.catalog.base_url = url;
        }
        if let Some(url) = get("TRANSIT_LIVE_URL") {
            config.live.base_url = url;
        }
        if let Some(key) = get("TRANSIT_API_KEY") {
            config.catalog = config.catalog.with_api_key(&key);
            config.live = config.live.with_api_key(key);
        }
        if let Some(dir) = get("TRANSIT_DATA_DIR") {
            config.store_path = PathBuf::from(&dir).join("users.json");
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("TRANSIT_STORE_PATH") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(dir) = get("TRANSIT_FEEDBACK_DIR") {
            config.feedback_dir = PathBuf::from(dir);
        }
        if let Some(hours) = get("TRANSIT_REFRESH_HOURS") {
            let parsed: u64 = parse("TRANSIT_REFRESH_HOURS", &hours)?;
            let invalid = |reason: &str| ConfigError::Invalid {
                var: "TRANSIT_REFRESH_HOURS",
                value: hours.clone(),
                reason: reason.into(),
            };
            if parsed == 0 {
                return Err(invalid("must be at least 1"));
            }
            let secs = parsed
                .checked_mul(60 * 60)
                .ok_or_else(|| invalid("too large"))?;
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = get("TRANSIT_PENDING_IDLE_SECS") {
            let secs: u64 = parse("TRANSIT_PENDING_IDLE_SECS", &secs)?;
            config.pending.idle = Duration::from_secs(secs);
        }
        if let Some(url) = get("TRANSIT_DONATE_URL") {
            config.donate_url = Some(url);
        }
        if let Some(lines) = get("TRANSIT_METRO_BANNED_LINES") {
            config.metro_banned_lines = lines
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn cache_config(&self) -> CatalogCacheConfig {
        CatalogCacheConfig::new(&self.data_dir)
    }

    /// Per-mode catalog build rules.
    pub fn build_rules(&self) -> HashMap<Mode, BuildRules> {
        let mut rules = HashMap::new();
        if !self.metro_banned_lines.is_empty() {
            rules.insert(Mode::Metro, BuildRules::with_banned(&self.metro_banned_lines));
        }
        rules
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

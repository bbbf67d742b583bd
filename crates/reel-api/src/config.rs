use std::net::SocketAddr;
use std::path::PathBuf;

use reel_query::QueryBuilder;

pub const DEFAULT_API_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read from `REEL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_addr: SocketAddr,
    /// JSON array or NDJSON file to seed the collection from. `None` starts
    /// with an empty collection.
    pub data_path: Option<PathBuf>,
    /// Upper bound applied to any requested `limit`.
    pub max_limit: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("REEL_API_ADDR").unwrap_or_else(|| DEFAULT_API_ADDR.into());
        let api_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "REEL_API_ADDR",
            value: raw_addr.clone(),
        })?;

        let data_path = lookup("REEL_DATA_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let max_limit = match lookup("REEL_MAX_LIMIT") {
            None => QueryBuilder::DEFAULT_MAX_LIMIT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "REEL_MAX_LIMIT",
                    value: raw,
                })?,
        };

        Ok(Self {
            api_addr,
            data_path,
            max_limit,
        })
    }
}

use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::admin::{MasterPassword, DEFAULT_RESET_DELAY};
use crate::database::{DEFAULT_LIMIT, MAX_LIMIT};

const GENERATED_PASSWORD_LENGTH: usize = 20;

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, value } => write!(f, "invalid value for {}: {:?}", key, value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps the records in memory.
    pub database_url: Option<String>,
    pub master_password: MasterPassword,
    pub leaderboard_limit: usize,
    pub clear_reset_delay: Duration,
}

impl Config {
    /// Reads the configuration from the environment and a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if database_url.is_none() {
            warn!("DATABASE_URL is not set, records are kept in memory only");
        }

        let master_password = match lookup("MASTER_PASSWORD").filter(|key| !key.is_empty()) {
            Some(key) => MasterPassword::new(key),
            None => {
                warn!("MASTER_PASSWORD is not set, clearing the leaderboard is disabled");
                MasterPassword::generate(GENERATED_PASSWORD_LENGTH)
            }
        };

        let leaderboard_limit =
            parse_or(&lookup, "LEADERBOARD_LIMIT", DEFAULT_LIMIT)?.clamp(1, MAX_LIMIT);
        let clear_reset_delay = match lookup("CLEAR_RESET_DELAY_SECS") {
            Some(value) => Duration::from_secs(parse("CLEAR_RESET_DELAY_SECS", value)?),
            None => DEFAULT_RESET_DELAY,
        };

        Ok(Self {
            database_url,
            master_password,
            leaderboard_limit,
            clear_reset_delay,
        })
    }

    /// Configuration with an in-memory store and a known admin password.
    pub fn in_memory(master_password: &str) -> Self {
        Self {
            database_url: None,
            master_password: MasterPassword::new(master_password),
            leaderboard_limit: DEFAULT_LIMIT,
            clear_reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_or<T: FromStr + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => parse(key, value),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

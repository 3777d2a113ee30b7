use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::session::{models::MAX_ROUND_DURATION, SessionTiming};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("{name} must be at most {max}")]
    TooLarge { name: &'static str, max: u64 },
}

/// Process configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Stats are kept in memory when unset
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    pub images_dir: PathBuf,
    pub timing: SessionTiming,
    pub default_duel_rounds: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            data_dir: PathBuf::from("data"),
            images_dir: PathBuf::from("Images"),
            timing: SessionTiming::default(),
            default_duel_rounds: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seconds = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var::<_, u64>(&lookup, name)?.map_or(default, Duration::from_secs))
        };

        let round_duration = seconds("ROUND_SECONDS", defaults.timing.round_duration)?;
        if round_duration.is_zero() {
            return Err(ConfigError::Zero {
                name: "ROUND_SECONDS",
            });
        }
        if round_duration > MAX_ROUND_DURATION {
            return Err(ConfigError::TooLarge {
                name: "ROUND_SECONDS",
                max: MAX_ROUND_DURATION.as_secs(),
            });
        }

        let default_duel_rounds = parse_var::<_, u32>(&lookup, "DEFAULT_DUEL_ROUNDS")?
            .unwrap_or(defaults.default_duel_rounds);
        if default_duel_rounds == 0 {
            return Err(ConfigError::Zero {
                name: "DEFAULT_DUEL_ROUNDS",
            });
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            data_dir: lookup("DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            images_dir: lookup("IMAGES_DIR").map_or(defaults.images_dir, PathBuf::from),
            timing: SessionTiming {
                round_duration,
                inter_round_pause: seconds(
                    "INTER_ROUND_PAUSE_SECONDS",
                    defaults.timing.inter_round_pause,
                )?,
                room_start_delay: seconds(
                    "ROOM_START_DELAY_SECONDS",
                    defaults.timing.room_start_delay,
                )?,
            },
            default_duel_rounds,
        })
    }
}

/// Parses a variable when it is set
fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidNumber { name, value }),
    }
}

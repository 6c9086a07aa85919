//! Application configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via `dotenvy`).
//! Missing or unparsable values fall back to defaults.

use crate::logic::{MatchmakingConfig, DEFAULT_MIN_ATTENDANCE};
use std::path::PathBuf;

/// Top-level configuration, loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Interface to bind the HTTP server to.
    pub host: String,

    pub port: u16,

    /// Default `env_logger` filter, e.g. `info` or `gameday_league=debug`.
    pub log_level: String,

    /// Partner selection tuning for plan generation.
    pub matchmaking: MatchmakingConfig,

    /// Smallest attendance pool when scheduling gamedays.
    pub min_attendance: usize,

    /// Roster CSV imported at startup, if set.
    pub players_csv: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            matchmaking: MatchmakingConfig::default(),
            min_attendance: DEFAULT_MIN_ATTENDANCE,
            players_csv: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let matchmaking = MatchmakingConfig {
            elo_spread: parse_env(&lookup, "ELO_SPREAD", defaults.matchmaking.elo_spread),
            partner_penalty: parse_env(&lookup, "PARTNER_PENALTY", defaults.matchmaking.partner_penalty),
            opponent_penalty: parse_env(&lookup, "OPPONENT_PENALTY", defaults.matchmaking.opponent_penalty),
        };

        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_env(&lookup, "PORT", defaults.port),
            log_level: lookup("LOG_LEVEL")
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.log_level),
            matchmaking,
            min_attendance: parse_env(&lookup, "MIN_ATTENDANCE", defaults.min_attendance),
            players_csv: lookup("PLAYERS_CSV")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid values.
fn parse_env<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

//! Daemon configuration.
//!
//! Every setting can come from a flag or its environment variable. The
//! duration settings are parsed leniently: a bad value is logged and the
//! default used, so a typo never keeps the exporter from starting.

use std::time::Duration;

use clap::{Args, ValueEnum};
use tracing::warn;

use runwatch_metrics::{DEFAULT_FETCH_TIMEOUT, DEFAULT_INTERVAL};
use runwatch_state::PgSettings;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Flags for `runwatchd serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port for the HTTP server.
    #[arg(long, env = "SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Seconds between poll cycles.
    #[arg(long, env = "UPDATE_INTERVAL")]
    pub update_interval: Option<String>,

    /// Seconds a single fetch may take before the cycle is abandoned.
    #[arg(long, env = "FETCH_TIMEOUT")]
    pub fetch_timeout: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub update_interval: Duration,
    pub fetch_timeout: Duration,
    pub database: PgSettings,
}

impl Config {
    /// Resolve flags into a configuration. Logs any value it had to replace.
    pub fn from_args(args: &ServeArgs) -> Self {
        Self {
            port: args.port,
            update_interval: parse_seconds(
                "UPDATE_INTERVAL",
                args.update_interval.as_deref(),
                DEFAULT_INTERVAL,
            ),
            fetch_timeout: parse_seconds(
                "FETCH_TIMEOUT",
                args.fetch_timeout.as_deref(),
                DEFAULT_FETCH_TIMEOUT,
            ),
            database: PgSettings {
                host: args.db_host.clone(),
                port: args.db_port,
                user: args.db_user.clone(),
                password: args.db_password.clone(),
                database: args.db_name.clone(),
                ..PgSettings::default()
            },
        }
    }
}

/// Parse a positive whole number of seconds.
///
/// Missing or blank input yields `default` silently; anything else that is
/// not a positive integer yields `default` with a warning.
pub fn parse_seconds(setting: &str, raw: Option<&str>, default: Duration) -> Duration {
    let value = match raw.map(str::trim) {
        None | Some("") => return default,
        Some(value) => value,
    };

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(
                setting,
                value,
                default_secs = default.as_secs(),
                "invalid value, using default"
            );
            default
        }
    }
}

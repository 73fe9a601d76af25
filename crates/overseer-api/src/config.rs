//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use overseer_engine::application::config::{DEFAULT_CHANNEL_CAPACITY, DispatcherConfig};
use overseer_lock::application::config::LockConfig;

use crate::error::AppError;

/// Everything the server reads from its environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `DATABASE_URL`.
    pub database_url: String,
    /// `HOST`, default `0.0.0.0`.
    pub host: String,
    /// `PORT`, default `3000`.
    pub port: u16,
    /// `OVERSEER_DB_MAX_CONNECTIONS`, default 10.
    pub db_max_connections: u32,
    /// `OVERSEER_CHANNEL_BUFFER`.
    pub dispatcher: DispatcherConfig,
    /// `OVERSEER_LOCK_POLL_INTERVAL_MS` and `OVERSEER_LOCK_MAX_POLL_INTERVAL_MS`.
    pub lock: LockConfig,
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's
    /// value or `None` when unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".into())
        })?;
        let defaults = LockConfig::default();
        let poll_ms = parse(&lookup, "OVERSEER_LOCK_POLL_INTERVAL_MS", millis(defaults.poll_interval))?;
        let max_poll_ms = parse(
            &lookup,
            "OVERSEER_LOCK_MAX_POLL_INTERVAL_MS",
            millis(defaults.max_poll_interval),
        )?;
        let channel_capacity = parse(&lookup, "OVERSEER_CHANNEL_BUFFER", DEFAULT_CHANNEL_CAPACITY)?;
        if channel_capacity == 0 {
            return Err(AppError::Config(
                "OVERSEER_CHANNEL_BUFFER must be positive".into(),
            ));
        }

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 3000)?,
            db_max_connections: parse(&lookup, "OVERSEER_DB_MAX_CONNECTIONS", 10)?,
            dispatcher: DispatcherConfig { channel_capacity },
            lock: LockConfig::new(
                Duration::from_millis(poll_ms),
                Duration::from_millis(max_poll_ms),
            ),
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid: {e}"))),
    }
}

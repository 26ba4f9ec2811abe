//! Builder-style connection helpers for MongoDB, MySQL and PostgreSQL.
//!
//! Each helper collects connection parameters (host, credentials, pool
//! sizing, protocol options) through chained setters, assembles the
//! driver-specific connection options, and hands back a ready-to-use client
//! handle. All actual connectivity, pooling and querying is delegated to the
//! underlying drivers (`mongodb`, `sqlx`).
//!
//! Each driver is conditionally compiled based on features.

mod error;

#[cfg(feature = "mongo")]
pub mod mongo;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(any(feature = "mysql", feature = "postgres"))]
pub mod pool;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{ConnectionError, Result};

#[cfg(feature = "mongo")]
pub use mongo::{AuthMode, Mongo};
#[cfg(feature = "mysql")]
pub use mysql::{ConnectParams, MySql, MySqlOptions};
#[cfg(any(feature = "mysql", feature = "postgres"))]
pub use pool::PoolSettings;
#[cfg(feature = "postgres")]
pub use postgres::{Postgres, PostgresOptions};

/// Information returned from a successful connection test
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub server_version: Option<String>,
    pub latency_ms: u64,
}

/// Map a level name to the filter used for SQL statement logging.
///
/// Anything other than `error`, `warn` or `info` disables statement logging.
pub fn statement_log_level(level: &str) -> log::LevelFilter {
    match level {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        _ => log::LevelFilter::Off,
    }
}

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while assembling options or connecting
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Connection timeout after {0:?}")]
    Timeout(Duration),
    #[cfg(feature = "mongo")]
    #[error("MongoDB driver error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[cfg(any(feature = "mysql", feature = "postgres"))]
    #[error("SQL driver error: {0}")]
    Sql(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ConnectionError>;

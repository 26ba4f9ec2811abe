//! PostgreSQL connection helper.
//!
//! Assembles `sqlx` connect options from chained setters and returns a
//! ready-to-use `PgPool`. The key/value DSN form of the configuration is
//! available through [`Postgres::dsn`] for diagnostics and logging.

use std::time::Instant;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{ConnectOptions, PgPool};

use crate::error::Result;
use crate::pool::PoolSettings;
use crate::ConnectionInfo;

/// Driver options applied on top of the connection fields.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    /// Prepare, execute and close every statement individually instead of
    /// caching prepared statements on the connection.
    pub prefer_simple_protocol: bool,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            prefer_simple_protocol: true,
        }
    }
}

/// Builder for a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct Postgres {
    host: String,
    port: u16,
    user: String,
    password: String,
    dbname: String,
    timezone: Option<String>,
    ssl_mode: Option<PgSslMode>,
    app_name: Option<String>,
    log_level: LevelFilter,
    options: PostgresOptions,
}

impl Postgres {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            timezone: None,
            ssl_mode: None,
            app_name: None,
            log_level: LevelFilter::Off,
            options: PostgresOptions::default(),
        }
    }

    /// Server `TimeZone` run-time parameter.
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// TLS requirement; connections made without calling this run with
    /// `sslmode=disable`.
    pub fn ssl_mode(mut self, mode: PgSslMode) -> Self {
        self.ssl_mode = Some(mode);
        self
    }

    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = dbname.into();
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Statement logging level, see [`crate::statement_log_level`].
    pub fn logger(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn options(mut self, options: PostgresOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the configuration as a libpq-style key/value DSN.
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.user, self.password, self.dbname
        );

        if let Some(timezone) = &self.timezone {
            dsn.push_str(&format!(" TimeZone={timezone}"));
        }

        let ssl = self.ssl_mode.unwrap_or(PgSslMode::Disable);
        dsn.push_str(&format!(" sslmode={}", ssl_mode_name(ssl)));

        dsn
    }

    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(self.ssl_mode.unwrap_or(PgSslMode::Disable));

        if let Some(timezone) = &self.timezone {
            options = options.options([("TimeZone", timezone.as_str())]);
        }
        if let Some(name) = &self.app_name {
            options = options.application_name(name);
        }
        if self.options.prefer_simple_protocol {
            options = options.statement_cache_capacity(0);
        }

        options.log_statements(self.log_level)
    }

    /// Connect with the driver's default pool sizing.
    pub async fn connect(&self) -> Result<PgPool> {
        self.connect_pool(PgPoolOptions::new()).await
    }

    /// Connect with explicit pool sizing.
    pub async fn connect_with(&self, pool: PoolSettings) -> Result<PgPool> {
        self.connect_pool(pool.apply(PgPoolOptions::new())).await
    }

    async fn connect_pool(&self, pool: PgPoolOptions) -> Result<PgPool> {
        tracing::debug!(
            host = %self.host,
            port = self.port,
            dbname = %self.dbname,
            "connecting to PostgreSQL"
        );
        Ok(pool.connect_with(self.connect_options()).await?)
    }

    /// Fetch the server version, measuring round-trip latency.
    pub async fn test_connection(&self, pool: &PgPool) -> Result<ConnectionInfo> {
        let start = Instant::now();

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(pool)
            .await?;

        Ok(ConnectionInfo {
            server_version: Some(version),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn ssl_mode_name(mode: PgSslMode) -> &'static str {
    match mode {
        PgSslMode::Disable => "disable",
        PgSslMode::Allow => "allow",
        PgSslMode::Prefer => "prefer",
        PgSslMode::Require => "require",
        PgSslMode::VerifyCa => "verify-ca",
        PgSslMode::VerifyFull => "verify-full",
    }
}

//! MongoDB connection helper.
//!
//! Collects client options through chained setters and hands back a
//! `mongodb::Client`. The client itself is lazy; use
//! [`Mongo::test_connection`] to verify the server is actually reachable.

use std::time::{Duration, Instant};

use mongodb::bson::doc;
use mongodb::event::cmap::CmapEvent;
use mongodb::event::EventHandler;
use mongodb::options::{AuthMechanism, ClientOptions, Credential};
use mongodb::Client;

use crate::error::{ConnectionError, Result};
use crate::ConnectionInfo;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Authentication mode passed to [`Mongo::auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Explicit PLAIN (LDAP) mechanism.
    Plain,
    /// SCRAM; the concrete variant is negotiated with the server.
    Scram,
}

/// Builder for a MongoDB client.
#[derive(Debug, Clone)]
pub struct Mongo {
    host: String,
    credential: Option<Credential>,
    replica_set: Option<String>,
    direct: Option<bool>,
    app_name: Option<String>,
    pool: Option<PoolSizing>,
    monitor: bool,
    timeout: Duration,
}

#[derive(Debug, Clone)]
struct PoolSizing {
    min: u32,
    max: u32,
    max_idle: Duration,
}

impl Mongo {
    /// `host` is a `host` or `host:port` pair; a blank host falls back to
    /// the driver default of `localhost:27017`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credential: None,
            replica_set: None,
            direct: None,
            app_name: None,
            pool: None,
            monitor: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn auth(
        mut self,
        mode: AuthMode,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut credential = Credential::default();
        credential.username = Some(username.into());
        credential.password = Some(password.into());
        if mode == AuthMode::Plain {
            credential.mechanism = Some(AuthMechanism::Plain);
        }
        self.credential = Some(credential);
        self
    }

    /// Ignored when `name` is blank.
    pub fn replica_set(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.replica_set = Some(name);
        }
        self
    }

    pub fn direct(mut self, direct: bool) -> Self {
        self.direct = Some(direct);
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Pool sizing: minimum and maximum pool size plus the idle time after
    /// which a connection is closed.
    pub fn pool(mut self, min: u32, max: u32, max_idle_secs: u64) -> Self {
        self.pool = Some(PoolSizing {
            min,
            max,
            max_idle: Duration::from_secs(max_idle_secs),
        });
        self
    }

    /// Log every connection-pool event at debug level.
    pub fn pool_monitor(mut self) -> Self {
        self.monitor = true;
        self
    }

    /// Connect and server-selection deadline; defaults to 180 s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn uri(&self) -> String {
        let host = self.host.trim();
        if host.is_empty() {
            "mongodb://localhost:27017".to_string()
        } else {
            format!("mongodb://{host}")
        }
    }

    /// Assemble the client options and create the client.
    pub async fn connect(&self) -> Result<Client> {
        // parse may resolve DNS, so it is bounded by the deadline too
        let mut options = tokio::time::timeout(self.timeout, ClientOptions::parse(self.uri()))
            .await
            .map_err(|_| ConnectionError::Timeout(self.timeout))??;

        options.connect_timeout = Some(self.timeout);
        options.server_selection_timeout = Some(self.timeout);
        options.credential = self.credential.clone();
        if self.replica_set.is_some() {
            options.repl_set_name = self.replica_set.clone();
        }
        options.direct_connection = self.direct;
        if self.app_name.is_some() {
            options.app_name = self.app_name.clone();
        }
        if let Some(pool) = &self.pool {
            options.min_pool_size = Some(pool.min);
            options.max_pool_size = Some(pool.max);
            options.max_idle_time = Some(pool.max_idle);
        }
        if self.monitor {
            options.cmap_event_handler = Some(EventHandler::callback(|event: CmapEvent| {
                tracing::debug!(?event, "connection pool event");
            }));
        }

        Ok(Client::with_options(options)?)
    }

    /// Ping the server and fetch its version, measuring round-trip latency.
    pub async fn test_connection(&self, client: &Client) -> Result<ConnectionInfo> {
        let start = Instant::now();

        let db = client.database("admin");
        tokio::time::timeout(self.timeout, db.run_command(doc! { "ping": 1 }))
            .await
            .map_err(|_| ConnectionError::Timeout(self.timeout))??;

        let build_info = tokio::time::timeout(self.timeout, db.run_command(doc! { "buildInfo": 1 }))
            .await
            .map_err(|_| ConnectionError::Timeout(self.timeout))??;

        let server_version = build_info
            .get_str("version")
            .ok()
            .map(|v| format!("MongoDB {v}"));

        Ok(ConnectionInfo {
            server_version,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_prepends_scheme() {
        let config = Mongo::new("db.example.com:27018");
        assert_eq!(config.uri(), "mongodb://db.example.com:27018");
    }

    #[test]
    fn blank_host_falls_back_to_localhost() {
        assert_eq!(Mongo::new("").uri(), "mongodb://localhost:27017");
        assert_eq!(Mongo::new("   ").uri(), "mongodb://localhost:27017");
    }

    #[test]
    fn plain_auth_sets_explicit_mechanism() {
        let config = Mongo::new("localhost").auth(AuthMode::Plain, "user", "pass");
        let credential = config.credential.expect("credential set");
        assert_eq!(credential.username.as_deref(), Some("user"));
        assert_eq!(credential.mechanism, Some(AuthMechanism::Plain));
    }

    #[test]
    fn scram_auth_leaves_mechanism_negotiated() {
        let config = Mongo::new("localhost").auth(AuthMode::Scram, "user", "pass");
        let credential = config.credential.expect("credential set");
        assert_eq!(credential.mechanism, None);
    }

    #[test]
    fn blank_replica_set_is_ignored() {
        let config = Mongo::new("localhost").replica_set("  ");
        assert_eq!(config.replica_set, None);

        let config = Mongo::new("localhost").replica_set("rs0");
        assert_eq!(config.replica_set.as_deref(), Some("rs0"));
    }

    #[test]
    fn default_timeout_is_three_minutes() {
        assert_eq!(Mongo::new("localhost").timeout, Duration::from_secs(180));
    }

    // Integration test requires a real server
    // Run with: MONGO_HOST=localhost:27017 cargo test -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn connects_and_pings() {
        let host = std::env::var("MONGO_HOST").expect("MONGO_HOST required");
        let config = Mongo::new(host).pool(0, 4, 60).pool_monitor();
        let client = config.connect().await.expect("connect failed");
        let info = config.test_connection(&client).await.expect("ping failed");
        assert!(info.server_version.is_some());
    }
}

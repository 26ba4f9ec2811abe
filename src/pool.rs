//! Pool sizing applied to the relational drivers.

use std::time::Duration;

use sqlx::pool::PoolOptions;
use sqlx::Database;

/// Sizing for a relational connection pool.
///
/// `max_idle` is the number of connections the pool keeps warm,
/// `max_open` the hard upper bound, `max_lifetime` how long a single
/// connection may be reused before it is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_idle: u32,
    pub max_open: u32,
    pub max_lifetime: Duration,
}

impl PoolSettings {
    pub fn new(max_idle: u32, max_open: u32, max_lifetime_secs: u64) -> Self {
        Self {
            max_idle,
            max_open,
            max_lifetime: Duration::from_secs(max_lifetime_secs),
        }
    }

    pub(crate) fn apply<DB: Database>(&self, options: PoolOptions<DB>) -> PoolOptions<DB> {
        options
            .min_connections(self.max_idle)
            .max_connections(self.max_open)
            .max_lifetime(self.max_lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_converts_lifetime_seconds() {
        let settings = PoolSettings::new(5, 20, 1800);
        assert_eq!(settings.max_idle, 5);
        assert_eq!(settings.max_open, 20);
        assert_eq!(settings.max_lifetime, Duration::from_secs(1800));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn apply_forwards_limits_to_pool_options() {
        let settings = PoolSettings::new(2, 8, 600);
        let options = settings.apply(PoolOptions::<sqlx::Postgres>::new());
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(600)));
    }
}

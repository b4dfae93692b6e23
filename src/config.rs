//! Store policy and database connection settings.

use std::{env, str::FromStr, time::Duration as StdDuration};

use argon2::{Algorithm, Argon2, Params, Version};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use time::Duration;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Default lifetime of a freshly issued session token.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::hours(24);

/// Argon2id cost parameters used when hashing new passwords.
///
/// Verification reads the parameters back out of the stored digest, so raising
/// the cost later does not invalidate existing passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashingConfig {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    pub(crate) fn hasher(&self) -> StoreResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Policy applied by the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a session token stays valid after it is issued.
    pub session_lifetime: Duration,
    /// Cost of password hashing.
    pub hashing: HashingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_lifetime: DEFAULT_SESSION_LIFETIME,
            hashing: HashingConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    pub fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }
}

/// Connection settings for the backing database.
///
/// # Environment
///
/// | Variable                        | Default | Meaning                         |
/// |---------------------------------|---------|---------------------------------|
/// | `DATABASE_URL`                  | (none)  | Connection string (required)    |
/// | `DATABASE_MAX_CONNECTIONS`      | 10      | Pool upper bound                |
/// | `DATABASE_MIN_CONNECTIONS`      | 1       | Pool lower bound                |
/// | `DATABASE_CONNECT_TIMEOUT_SECS` | 10      | Connect and acquire timeout     |
/// | `DATABASE_SQLX_LOGGING`         | false   | Log every statement via sqlx    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: StdDuration,
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: StdDuration::from_secs(10),
            sqlx_logging: false,
        }
    }

    /// Reads the settings from the process environment, loading `.env` first
    /// if one is present.
    ///
    /// # Errors
    ///
    /// [`StoreError::Config`] when `DATABASE_URL` is unset or a variable does
    /// not parse.
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let url = lookup("DATABASE_URL")
            .ok_or_else(|| StoreError::Config("DATABASE_URL must be set".to_string()))?;
        let mut config = Self::new(url);

        if let Some(max) = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(min) = parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")? {
            config.min_connections = min;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "DATABASE_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = StdDuration::from_secs(secs);
        }
        if let Some(logging) = parse_var(&lookup, "DATABASE_SQLX_LOGGING")? {
            config.sqlx_logging = logging;
        }

        Ok(config)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.connect_timeout)
            .sqlx_logging(self.sqlx_logging);
        opt
    }

    /// Opens a connection pool with these settings.
    pub async fn connect(&self) -> StoreResult<DatabaseConnection> {
        info!(
            max_connections = self.max_connections,
            "connecting to database"
        );
        Ok(Database::connect(self.connect_options()).await?)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> StoreResult<Option<T>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| StoreError::Config(format!("{name} has an invalid value: {raw}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_session_lifetime_is_one_day() {
        assert_eq!(StoreConfig::default().session_lifetime, Duration::days(1));
    }

    #[test]
    fn invalid_hashing_parameters_are_rejected() {
        let config = HashingConfig::new(1, 0, 0);
        assert!(matches!(config.hasher(), Err(StoreError::Hashing(_))));
    }

    #[test]
    fn connect_options_carry_the_url() {
        let config = DatabaseConfig::new("sqlite::memory:");
        assert_eq!(config.connect_options().get_url(), "sqlite::memory:");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/recipes"),
            ("DATABASE_MAX_CONNECTIONS", " 25 "),
            ("DATABASE_CONNECT_TIMEOUT_SECS", "3"),
            ("DATABASE_SQLX_LOGGING", "true"),
        ]))
        .unwrap();

        assert_eq!(config.url, "postgres://localhost/recipes");
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, StdDuration::from_secs(3));
        assert!(config.sqlx_logging);
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "5")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(ref msg) if msg.contains("DATABASE_URL")), "{err:?}");
    }

    #[test]
    fn unparsable_value_is_a_config_error() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "abc"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, StoreError::Config(ref msg) if msg.contains("DATABASE_MAX_CONNECTIONS")),
            "{err:?}"
        );
    }
}

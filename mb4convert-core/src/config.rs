//! Run configuration.
//!
//! [`ConnectionConfig`] describes where to connect and [`MigrationConfig`]
//! describes what the run does. Neither stores a password; see
//! [`crate::Credentials`].

use std::path::PathBuf;
use std::time::Duration;

/// MariaDB default port
pub const DEFAULT_PORT: u16 = 3306;

/// Longest identifier MariaDB accepts for a database name
const MAX_DATABASE_NAME_LEN: usize = 64;

/// Upper bound for `connect_timeout`
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the database session.
///
/// # Example
/// ```rust
/// use mb4convert_core::ConnectionConfig;
///
/// let config = ConnectionConfig::new("db.internal".to_string(), "shop".to_string())
///     .with_port(3307)
///     .with_username("admin".to_string());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "db.internal:3307/shop");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Schema to convert
    pub database: String,
    /// Login user (password handled separately)
    pub username: String,
    /// How long to wait for the session to open
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: String::new(),
            username: "root".to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Username is left out so log lines carry no part of the login
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with defaults for everything else.
    pub fn new(host: String, database: String) -> Self {
        Self {
            host,
            database,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = username;
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::error::MigrateError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::MigrateError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.username.is_empty() {
            return Err(crate::error::MigrateError::configuration(
                "username cannot be empty",
            ));
        }

        if self.database.is_empty() {
            return Err(crate::error::MigrateError::configuration(
                "database cannot be empty",
            ));
        }

        if self.database.chars().count() > MAX_DATABASE_NAME_LEN {
            return Err(crate::error::MigrateError::configuration(format!(
                "database name too long: maximum {} characters",
                MAX_DATABASE_NAME_LEN
            )));
        }

        if self.connect_timeout.is_zero() || self.connect_timeout > MAX_CONNECT_TIMEOUT {
            return Err(crate::error::MigrateError::configuration(
                "connect_timeout must be between 1 and 300 seconds",
            ));
        }

        Ok(())
    }
}

/// Options for a single conversion run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Session target
    pub connection: ConnectionConfig,
    /// Execute statements immediately instead of printing a plan
    pub apply: bool,
    /// SQL lines dispatched before the conversion
    pub prelude: Option<PathBuf>,
    /// SQL lines dispatched after the per-table conversion
    pub fixup: Option<PathBuf>,
    /// Where to write the JSON run report
    pub report: Option<PathBuf>,
}

impl MigrationConfig {
    /// Creates a plan-mode configuration with no hook files.
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            apply: false,
            prelude: None,
            fixup: None,
            report: None,
        }
    }

    /// Builder method to switch between apply and plan mode.
    pub fn with_apply(mut self, apply: bool) -> Self {
        self.apply = apply;
        self
    }

    /// Builder method to set the prelude file.
    pub fn with_prelude(mut self, path: Option<PathBuf>) -> Self {
        self.prelude = path;
        self
    }

    /// Builder method to set the fixup file.
    pub fn with_fixup(mut self, path: Option<PathBuf>) -> Self {
        self.fixup = path;
        self
    }

    /// Builder method to set the report destination.
    pub fn with_report(mut self, path: Option<PathBuf>) -> Self {
        self.report = path;
        self
    }

    /// Validates the connection settings and that hook files exist.
    ///
    /// # Errors
    /// Returns a configuration error if the connection settings are invalid
    /// or a prelude or fixup file does not exist.
    pub fn validate(&self) -> crate::Result<()> {
        self.connection.validate()?;

        for (label, path) in [("prelude", &self.prelude), ("fixup", &self.fixup)] {
            if let Some(path) = path
                && !path.is_file()
            {
                return Err(crate::error::MigrateError::configuration(format!(
                    "{} file does not exist: {}",
                    label,
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

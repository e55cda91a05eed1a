//! MariaDB session over a single sqlx connection.
//!
//! Statements are sent through the text protocol (no bind arguments), which
//! accepts `LOCK TABLES` and the other session statements that MariaDB
//! refuses to prepare.

use super::Session;
use crate::Result;
use crate::config::ConnectionConfig;
use crate::credentials::Credentials;
use crate::error::MigrateError;
use crate::statements::{DISABLE_AUTOCOMMIT, TARGET_CHARSET};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor, Row};

/// Base tables of one schema, in name order.
// Cast to CHAR to avoid VARBINARY decoding on servers that report identifiers as binary
const TABLES_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ?
    AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

/// Session against a live MariaDB (or MySQL) server.
pub struct MariaDbSession {
    conn: MySqlConnection,
    config: ConnectionConfig,
}

impl std::fmt::Debug for MariaDbSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MariaDbSession")
            .field("target", &self.config.to_string())
            .finish_non_exhaustive()
    }
}

impl MariaDbSession {
    /// Opens the session and disables autocommit.
    ///
    /// Autocommit is informational only: every DDL statement the run issues
    /// commits implicitly.
    ///
    /// # Errors
    /// Returns error if:
    /// - The configuration is invalid
    /// - The server is unreachable within `connect_timeout`
    /// - Authentication fails
    pub async fn connect(config: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        let options = connect_options(config, credentials);
        tracing::info!("Connecting to {}", config);

        let conn = tokio::time::timeout(
            config.connect_timeout,
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|e| {
            MigrateError::connection_failed(format!("Timed out connecting to {}", config), e)
        })?
        .map_err(|e| {
            MigrateError::connection_failed(format!("Failed to connect to {}", config), e)
        })?;

        let mut session = Self {
            conn,
            config: config.clone(),
        };
        session.execute(DISABLE_AUTOCOMMIT).await?;

        tracing::info!("Connected to {}", config);
        Ok(session)
    }

    /// Target this session was opened against
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Closes the connection gracefully
    ///
    /// # Errors
    /// Returns error if the server cannot be told the session is ending
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| MigrateError::query_failed("Failed to close connection", e))
    }
}

#[async_trait]
impl Session for MariaDbSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute(sql)
            .await
            .map_err(|e| classify_error(sql, e))?;
        Ok(())
    }

    async fn list_tables(&mut self, database: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLES_QUERY)
            .bind(database)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| MigrateError::query_failed("Failed to enumerate tables", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("TABLE_NAME")
                    .map_err(|e| MigrateError::query_failed("Failed to parse table name", e))
            })
            .collect()
    }

    async fn fetch_scalar(&mut self, sql: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, Option<String>>(sql)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| classify_error(sql, e))?;
        Ok(value.flatten())
    }

    async fn commit(&mut self) -> Result<()> {
        self.execute("COMMIT").await
    }
}

/// Builds driver options from the config and credentials.
fn connect_options(config: &ConnectionConfig, credentials: &Credentials) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(credentials.username())
        .database(&config.database)
        .charset(TARGET_CHARSET);

    match credentials.password() {
        Some(password) => options.password(password),
        None => options,
    }
}

/// Splits driver errors into server refusals and everything else.
///
/// `sqlx::Error::Database` carries an error packet the server sent back
/// after running the statement; those are the failures a run can survive.
fn classify_error(statement: &str, error: sqlx::Error) -> MigrateError {
    match error {
        sqlx::Error::Database(_) => MigrateError::statement_rejected(statement, error),
        other => MigrateError::query_failed(format!("Failed to execute `{}`", statement), other),
    }
}

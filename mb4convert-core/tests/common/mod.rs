//! Scripted in-memory session shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mb4convert_core::{Console, MigrateError, Result, Session};
use std::collections::HashSet;

/// Session that replays a fixed table list and fails on chosen statements.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    /// Returned by `list_tables`
    pub tables: Vec<String>,
    /// Every statement passed to `execute`, including failed ones
    pub executed: Vec<String>,
    /// Queries passed to `fetch_scalar`
    pub queried: Vec<String>,
    /// Statements the "server" refuses
    pub rejected: HashSet<String>,
    /// Statements that fail as if the connection dropped
    pub broken: HashSet<String>,
    /// Value returned by `fetch_scalar`
    pub foreign_key_checks: Option<String>,
    /// Number of `commit` calls
    pub commits: usize,
}

impl ScriptedSession {
    pub fn with_tables(tables: &[&str]) -> Self {
        Self {
            tables: tables.iter().map(|t| t.to_string()).collect(),
            foreign_key_checks: Some("0".to_string()),
            ..Default::default()
        }
    }

    pub fn reject(mut self, statement: impl Into<String>) -> Self {
        self.rejected.insert(statement.into());
        self
    }

    pub fn break_on(mut self, statement: impl Into<String>) -> Self {
        self.broken.insert(statement.into());
        self
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.executed.push(sql.to_string());

        if self.rejected.contains(sql) {
            return Err(MigrateError::statement_rejected(
                sql,
                std::io::Error::other("Error 1832: Cannot change column used in a foreign key"),
            ));
        }
        if self.broken.contains(sql) {
            return Err(MigrateError::query_failed(
                format!("Failed to execute `{}`", sql),
                std::io::Error::from(std::io::ErrorKind::ConnectionReset),
            ));
        }
        Ok(())
    }

    async fn list_tables(&mut self, _database: &str) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn fetch_scalar(&mut self, sql: &str) -> Result<Option<String>> {
        self.queried.push(sql.to_string());
        Ok(self.foreign_key_checks.clone())
    }

    async fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}

/// Console writing into memory without styling.
pub fn buffer_console() -> Console<Vec<u8>> {
    Console::new(Vec::new(), false)
}

pub fn console_text(console: Console<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).expect("console output is UTF-8")
}

pub const ALTER_SHOP: &str =
    "ALTER SCHEMA shop DEFAULT CHARACTER SET utf8mb4 DEFAULT COLLATE utf8mb4_general_ci;";
pub const ALTER_USERS: &str =
    "ALTER TABLE users CONVERT TO CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci;";
pub const ALTER_ORDERS: &str =
    "ALTER TABLE orders CONVERT TO CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci;";

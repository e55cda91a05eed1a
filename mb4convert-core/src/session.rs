//! Database session abstraction.
//!
//! A run issues every statement over one [`Session`]. `LOCK TABLES` and
//! `FOREIGN_KEY_CHECKS` are scoped to the session that set them, so an
//! implementation must never spread statements across connections.
//!
//! # Module Structure
//! - `mariadb`: [`MariaDbSession`] over a single sqlx `MySqlConnection`

pub mod mariadb;

pub use mariadb::MariaDbSession;

use crate::Result;
use async_trait::async_trait;

/// One exclusive connection to the server.
///
/// # Errors
/// Implementations report server-side refusals as
/// [`crate::MigrateError::StatementRejected`] and every other failure as a
/// fatal variant. The orchestrator relies on that split to isolate per-table
/// failures.
///
/// # Object Safety
/// The orchestrator works against `&mut dyn Session`.
#[async_trait]
pub trait Session: Send {
    /// Executes one statement, discarding any result set.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Lists the base tables of `database` in server order.
    async fn list_tables(&mut self, database: &str) -> Result<Vec<String>>;

    /// Runs a query and returns the first column of the first row.
    async fn fetch_scalar(&mut self, sql: &str) -> Result<Option<String>>;

    /// Commits the session's open transaction.
    async fn commit(&mut self) -> Result<()>;
}

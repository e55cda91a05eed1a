//! Core library for mb4convert.
//!
//! Converts a MariaDB schema and every table in it to `utf8mb4` /
//! `utf8mb4_general_ci`. The heavy lifting is done by the server; this crate
//! decides which statements to send, in what order, and what to do when one
//! of them fails.
//!
//! # Guarantees
//! - Plan mode sends nothing but the table listing to the server
//! - A refused table conversion never stops the remaining tables
//! - Passwords are zeroized on drop and never logged
//!
//! # Architecture
//! - [`session::Session`] abstracts the single database connection
//! - [`executor::StatementExecutor`] is the apply-or-plan strategy chosen once per run
//! - [`migration::Migrator`] sequences the statements

pub mod config;
pub mod console;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod logging;
pub mod migration;
pub mod report;
pub mod session;
pub mod statements;

// Re-export commonly used types
pub use config::{ConnectionConfig, MigrationConfig};
pub use console::Console;
pub use credentials::Credentials;
pub use error::{MigrateError, Result};
pub use executor::{ApplyExecutor, PlanRecorder, StatementExecutor, executor_for};
pub use logging::init_logging;
pub use migration::{AbortedRun, Migrator, migrate};
pub use report::{MigrationOutcome, MigrationReport, RunMode};
pub use session::{MariaDbSession, Session};

//! Error types for conversion runs.
//!
//! Errors fall into two tiers. A [`MigrateError::StatementRejected`] raised by
//! a per-table `ALTER TABLE` is recorded and the run continues; every other
//! variant aborts the run. Passwords never appear in any message produced here.

use std::path::Path;
use thiserror::Error;

/// Main error type for mb4convert operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Could not open the database session
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server executed the statement and reported an error
    #[error("Statement rejected by server: {statement}")]
    StatementRejected {
        statement: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The statement could not be delivered or its result read
    #[error("Query execution failed: {context}")]
    QueryExecution {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid option or argument
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with MigrateError
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Creates a connection error with a credential-free context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a server-side rejection for `statement`
    pub fn statement_rejected<E>(statement: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StatementRejected {
            statement: statement.into(),
            source: Box::new(error),
        }
    }

    /// Creates a query execution error with context
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::QueryExecution {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error naming the file involved
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("Failed to {} {}", action, path.display()),
            source,
        }
    }

    /// Whether the server itself refused the statement.
    ///
    /// Only these errors are isolated per table; transport and connection
    /// failures abort the run.
    pub fn is_statement_rejected(&self) -> bool {
        matches!(self, Self::StatementRejected { .. })
    }

    /// The innermost message, usually the server's own error text.
    pub fn detail(&self) -> String {
        let mut current: &dyn std::error::Error = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }
}

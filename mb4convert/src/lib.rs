//! Library module for mb4convert
//!
//! Exposes the command-line surface for testing purposes. The binary
//! entry point is in main.rs.

use clap::Parser;
use mb4convert_core::{ConnectionConfig, Credentials, MigrateError, MigrationConfig, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI argument structure
#[derive(Parser)]
#[command(name = "mb4convert")]
#[command(about = "Convert a MariaDB schema and all of its tables to utf8mb4")]
#[command(version)]
#[command(long_about = "
mb4convert - MariaDB utf8mb4 conversion

Changes the default character set and collation of DATABASE and converts
every table in it to utf8mb4 / utf8mb4_general_ci.

Without --apply nothing is changed: the statements are collected and printed
so they can be reviewed and run by hand.

Tables the server refuses to convert (typically because of foreign keys) are
listed at the end. Use --prelude and --fixup to drop and re-create the
constraints involved.

EXAMPLES:
  mb4convert db.internal 3306 admin shop
  mb4convert --apply --fixup fixup.sql db.internal 3306 admin shop
  DB_PASSWORD=secret mb4convert -vv --apply localhost 3306 root shop
")]
pub struct Cli {
    /// Database server host
    pub hostname: String,

    /// Database server port
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Login user
    pub username: String,

    /// Schema to convert
    pub database: String,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, help = "Only log errors")]
    pub quiet: bool,

    /// Execute statements instead of printing a plan
    #[arg(
        long,
        help = "Execute the statements immediately (default: print a plan)"
    )]
    pub apply: bool,

    /// SQL run before the conversion
    #[arg(
        long,
        value_name = "FILE",
        value_parser = existing_file,
        help = "SQL file dispatched before the conversion, one statement per line"
    )]
    pub prelude: Option<PathBuf>,

    /// SQL run after the conversion
    #[arg(
        long,
        value_name = "FILE",
        value_parser = existing_file,
        help = "SQL file dispatched after the table conversions, one statement per line"
    )]
    pub fixup: Option<PathBuf>,

    /// Login password
    #[arg(
        long,
        env = "DB_PASSWORD",
        hide_env_values = true,
        help = "Login password (default: DB_PASSWORD, else prompt; empty answer = none)"
    )]
    pub password: Option<String>,

    /// Connect timeout in seconds
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..=300),
        help = "Seconds to wait for the connection"
    )]
    pub connect_timeout: u64,

    /// JSON report destination
    #[arg(
        long,
        value_name = "FILE",
        help = "Write a JSON run report to FILE, also when the run aborts"
    )]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Builds the run configuration from the parsed arguments.
    ///
    /// # Errors
    /// Returns a configuration error if the arguments describe an invalid
    /// connection or name a hook file that does not exist.
    pub fn migration_config(&self) -> Result<MigrationConfig> {
        let connection = ConnectionConfig::new(self.hostname.clone(), self.database.clone())
            .with_port(self.port)
            .with_username(self.username.clone())
            .with_connect_timeout(Duration::from_secs(self.connect_timeout));

        let config = MigrationConfig::new(connection)
            .with_apply(self.apply)
            .with_prelude(self.prelude.clone())
            .with_fixup(self.fixup.clone())
            .with_report(self.report.clone());

        config.validate()?;
        Ok(config)
    }

    /// Resolves credentials, prompting for the password when it was not given.
    ///
    /// `prompt` is only called when neither `--password` nor `DB_PASSWORD`
    /// supplied one. An empty answer means "no password".
    ///
    /// # Errors
    /// Returns an I/O error if the prompt cannot be read.
    pub fn credentials<F>(&mut self, prompt: F) -> Result<Credentials>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let password = match self.password.take() {
            Some(password) => Some(password),
            None => {
                let entered = prompt().map_err(|e| MigrateError::Io {
                    context: "Failed to read password".to_string(),
                    source: e,
                })?;
                (!entered.is_empty()).then_some(entered)
            }
        };

        Ok(Credentials::new(self.username.clone(), password))
    }
}

/// Reads the password from the terminal without echo.
pub fn prompt_password() -> std::io::Result<String> {
    rpassword::prompt_password("Password: ")
}

/// Accepts only paths to existing files.
fn existing_file(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file does not exist: {}", value))
    }
}

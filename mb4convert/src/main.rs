//! MariaDB utf8mb4 conversion tool.
//!
//! Converts the default character set of a schema and of every table in it
//! to utf8mb4. Prints a reviewable plan unless `--apply` is given.
//!
//! # Guarantees
//! - Nothing is altered without `--apply`
//! - The password is never logged or echoed
//! - Refused table conversions are reported, not fatal

use clap::Parser;
use mb4convert::{Cli, prompt_password};
use mb4convert_core::{Console, MariaDbSession, Result, init_logging, migrate};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet)?;

    let config = cli.migration_config()?;
    let credentials = cli.credentials(prompt_password)?;

    let mut session = MariaDbSession::connect(&config.connection, &credentials)
        .await
        .map_err(|e| {
            error!("Failed to connect: {}", e);
            e
        })?;
    drop(credentials);

    let mut console = Console::stdout();
    let outcome = migrate(&config, &mut session, &mut console)
        .await
        .map_err(|e| {
            error!("Conversion aborted: {}", e);
            e
        })?;

    if let Err(e) = session.close().await {
        warn!("{}", e);
    }

    if outcome.is_clean() {
        info!("✓ {} run finished for {}", outcome.mode, outcome.database);
    } else {
        warn!(
            "{} run finished for {} with {} failed tables",
            outcome.mode,
            outcome.database,
            outcome.failed_tables.len()
        );
    }

    Ok(())
}

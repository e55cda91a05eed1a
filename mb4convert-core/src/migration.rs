//! Conversion run orchestration.
//!
//! A run dispatches, in order:
//!
//! 1. prelude statements
//! 2. `ALTER SCHEMA`
//! 3. `LOCK TABLES` over every discovered table
//! 4. foreign key checks off
//! 5. one `ALTER TABLE ... CONVERT` per table, in discovery order
//! 6. fixup statements
//! 7. foreign key checks on, then `UNLOCK TABLES`
//!
//! Every statement goes through the run's [`StatementExecutor`]. A table
//! conversion the server refuses is recorded and the run moves on; any other
//! error ends the run.
//!
//! When an apply-mode run ends early, foreign key checks are re-enabled and
//! the locks released on a best-effort basis before the error is returned.

use crate::Result;
use crate::config::MigrationConfig;
use crate::console::Console;
use crate::error::MigrateError;
use crate::executor::{StatementExecutor, executor_for};
use crate::hooks::load_hook_file;
use crate::report::{MigrationOutcome, MigrationReport, RunMode, write_report};
use crate::session::Session;
use crate::statements::{
    DISABLE_FOREIGN_KEY_CHECKS, ENABLE_FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS_QUERY, UNLOCK_TABLES,
    alter_schema, convert_table, lock_tables,
};
use std::io::Write;
use tracing::{info, warn};

/// Conversion of one schema.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    database: String,
    prelude: Vec<String>,
    fixup: Vec<String>,
}

impl Migrator {
    /// Conversion of `database` with no hook statements.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Statements dispatched before anything else.
    pub fn with_prelude(mut self, statements: Vec<String>) -> Self {
        self.prelude = statements;
        self
    }

    /// Statements dispatched after the per-table conversions.
    pub fn with_fixup(mut self, statements: Vec<String>) -> Self {
        self.fixup = statements;
        self
    }

    /// Runs the conversion.
    ///
    /// # Errors
    /// Returns the first error that is not a refused table conversion.
    pub async fn run<W: Write + Send>(
        &self,
        session: &mut dyn Session,
        executor: &mut dyn StatementExecutor,
        console: &mut Console<W>,
    ) -> Result<MigrationOutcome> {
        self.run_tracked(session, executor, console)
            .await
            .map_err(|aborted| aborted.error)
    }

    /// Runs the conversion, keeping what an aborted run got through.
    ///
    /// # Errors
    /// Returns the first error that is not a refused table conversion,
    /// together with the outcome recorded up to that point.
    pub async fn run_tracked<W: Write + Send>(
        &self,
        session: &mut dyn Session,
        executor: &mut dyn StatementExecutor,
        console: &mut Console<W>,
    ) -> std::result::Result<MigrationOutcome, Box<AbortedRun>> {
        let mut progress = Progress::default();

        match self
            .run_steps(session, executor, console, &mut progress)
            .await
        {
            Ok(()) => Ok(progress.into_outcome(&self.database, executor)),
            Err(error) => {
                if executor.is_live() && progress.session_altered {
                    restore_session(session).await;
                }
                Err(Box::new(AbortedRun {
                    error,
                    outcome: progress.into_outcome(&self.database, executor),
                }))
            }
        }
    }

    async fn run_steps<W: Write + Send>(
        &self,
        session: &mut dyn Session,
        executor: &mut dyn StatementExecutor,
        console: &mut Console<W>,
        progress: &mut Progress,
    ) -> Result<()> {
        let live = executor.is_live();
        console.headline(&self.database)?;

        dispatch_hooks(session, executor, &self.prelude, "prelude").await?;

        progress.tables = session.list_tables(&self.database).await?;
        info!(
            "Found {} tables in {}",
            progress.tables.len(),
            self.database
        );

        executor
            .submit(session, alter_schema(&self.database))
            .await?;

        progress.session_altered = true;
        match lock_tables(&progress.tables) {
            Some(lock) => executor.submit(session, lock).await?,
            None => warn!("No tables in {}, skipping LOCK TABLES", self.database),
        }
        executor
            .submit(session, DISABLE_FOREIGN_KEY_CHECKS.to_string())
            .await?;

        if live {
            let value = session.fetch_scalar(FOREIGN_KEY_CHECKS_QUERY).await?;
            console.foreign_key_checks(value.as_deref())?;
            progress.foreign_key_checks = value;
        }

        for table in &progress.tables {
            console.table_progress(table)?;
            match executor.submit(session, convert_table(table)).await {
                Ok(()) => progress.converted_tables.push(table.clone()),
                Err(err) if err.is_statement_rejected() => {
                    warn!("Conversion of table {} rejected: {}", table, err.detail());
                    console.table_rejected(&err.detail())?;
                    progress.failed_tables.push(table.clone());
                }
                Err(err) => return Err(err),
            }
        }
        console.failed_tables(&progress.failed_tables)?;

        dispatch_hooks(session, executor, &self.fixup, "fixup").await?;

        executor
            .submit(session, ENABLE_FOREIGN_KEY_CHECKS.to_string())
            .await?;
        executor.submit(session, UNLOCK_TABLES.to_string()).await?;
        progress.session_altered = false;

        if live {
            session.commit().await?;
            info!(
                "✓ Converted {} of {} tables in {}",
                progress.converted_tables.len(),
                progress.tables.len(),
                self.database
            );
        } else {
            console.plan(executor.plan())?;
        }

        Ok(())
    }
}

/// A run that ended early, with what it got through before the error.
#[derive(Debug)]
pub struct AbortedRun {
    /// Error that ended the run
    pub error: MigrateError,
    /// Tables discovered and converted before the error
    pub outcome: MigrationOutcome,
}

/// State a run accumulates as it goes.
#[derive(Debug, Default)]
struct Progress {
    tables: Vec<String>,
    converted_tables: Vec<String>,
    failed_tables: Vec<String>,
    foreign_key_checks: Option<String>,
    // Set between the schema ALTER and UNLOCK TABLES
    session_altered: bool,
}

impl Progress {
    fn into_outcome(
        self,
        database: &str,
        executor: &mut dyn StatementExecutor,
    ) -> MigrationOutcome {
        MigrationOutcome {
            database: database.to_string(),
            mode: RunMode::from_apply(executor.is_live()),
            tables: self.tables,
            converted_tables: self.converted_tables,
            failed_tables: self.failed_tables,
            statements: executor.take_plan(),
            foreign_key_checks: self.foreign_key_checks,
        }
    }
}

/// Loads hook files, runs the conversion and writes the optional report.
///
/// The executor is chosen here, once, from `config.apply`. The report is
/// written for aborted runs too, marked with the error that ended them.
///
/// # Errors
/// Returns hook file read errors, the error that aborted the run, or a
/// failure to write the report of a completed run.
pub async fn migrate<W: Write + Send>(
    config: &MigrationConfig,
    session: &mut dyn Session,
    console: &mut Console<W>,
) -> Result<MigrationOutcome> {
    let prelude = match &config.prelude {
        Some(path) => load_hook_file(path).await?,
        None => Vec::new(),
    };
    let fixup = match &config.fixup {
        Some(path) => load_hook_file(path).await?,
        None => Vec::new(),
    };

    let migrator = Migrator::new(config.connection.database.clone())
        .with_prelude(prelude)
        .with_fixup(fixup);

    let mut executor = executor_for(config.apply);
    info!(
        "Starting {} run against {}",
        RunMode::from_apply(config.apply),
        config.connection
    );

    match migrator
        .run_tracked(session, executor.as_mut(), console)
        .await
    {
        Ok(outcome) => {
            if let Some(path) = &config.report {
                write_report(path, &MigrationReport::new(outcome.clone())).await?;
            }
            Ok(outcome)
        }
        Err(aborted) => {
            let AbortedRun { error, outcome } = *aborted;
            if let Some(path) = &config.report {
                let report = MigrationReport::aborted(outcome, &error);
                if let Err(e) = write_report(path, &report).await {
                    warn!("Could not save report of aborted run: {}", e);
                }
            }
            Err(error)
        }
    }
}

async fn dispatch_hooks(
    session: &mut dyn Session,
    executor: &mut dyn StatementExecutor,
    statements: &[String],
    label: &str,
) -> Result<()> {
    if !statements.is_empty() {
        info!("Dispatching {} {} statements", statements.len(), label);
    }
    for statement in statements {
        executor.submit(session, statement.clone()).await?;
    }
    Ok(())
}

/// Best-effort restore after an aborted apply run.
async fn restore_session(session: &mut dyn Session) {
    warn!("Run aborted, restoring foreign key checks and releasing table locks");
    for statement in [ENABLE_FOREIGN_KEY_CHECKS, UNLOCK_TABLES] {
        if let Err(e) = session.execute(statement).await {
            warn!("Cleanup statement `{}` failed: {}", statement, e);
        }
    }
}

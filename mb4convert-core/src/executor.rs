//! Conditional statement executor.
//!
//! Every generated statement goes through one [`StatementExecutor`], chosen
//! once per run by [`executor_for`]: [`ApplyExecutor`] runs it on the live
//! session, [`PlanRecorder`] appends it to the plan. A statement is never
//! both executed and recorded.

use crate::Result;
use crate::session::Session;
use async_trait::async_trait;

/// Dispatch strategy for generated SQL.
#[async_trait]
pub trait StatementExecutor: Send {
    /// Executes or records `sql`.
    ///
    /// # Errors
    /// Only the apply strategy fails, with whatever the session reports.
    async fn submit(&mut self, session: &mut dyn Session, sql: String) -> Result<()>;

    /// Whether submitted statements reach the server.
    fn is_live(&self) -> bool;

    /// Statements recorded so far, in submission order.
    fn plan(&self) -> &[String];

    /// Takes the recorded plan, leaving the executor empty.
    fn take_plan(&mut self) -> Vec<String>;
}

/// Picks the strategy for a run.
pub fn executor_for(apply: bool) -> Box<dyn StatementExecutor> {
    if apply {
        Box::new(ApplyExecutor)
    } else {
        Box::new(PlanRecorder::default())
    }
}

/// Runs each statement immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApplyExecutor;

#[async_trait]
impl StatementExecutor for ApplyExecutor {
    async fn submit(&mut self, session: &mut dyn Session, sql: String) -> Result<()> {
        tracing::debug!("Executing: {}", sql);
        session.execute(&sql).await
    }

    fn is_live(&self) -> bool {
        true
    }

    fn plan(&self) -> &[String] {
        &[]
    }

    fn take_plan(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Collects statements for an operator to review.
#[derive(Debug, Default, Clone)]
pub struct PlanRecorder {
    statements: Vec<String>,
}

#[async_trait]
impl StatementExecutor for PlanRecorder {
    async fn submit(&mut self, _session: &mut dyn Session, sql: String) -> Result<()> {
        tracing::debug!("Planned: {}", sql);
        self.statements.push(sql);
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }

    fn plan(&self) -> &[String] {
        &self.statements
    }

    fn take_plan(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }
}

//! Apply mode tests.
//!
//! These tests cover:
//! - Execution order against the session
//! - Per-table rejection isolation and the failed-table report
//! - Fatal errors and session cleanup
//! - Foreign key check echo
//! - Partial outcome and report of an aborted run

mod common;

use common::{
    ALTER_ORDERS, ALTER_SHOP, ALTER_USERS, ScriptedSession, buffer_console, console_text,
};
use mb4convert_core::{
    ApplyExecutor, ConnectionConfig, MigrateError, MigrationConfig, Migrator, RunMode, migrate,
};

#[tokio::test]
async fn test_apply_order() {
    let mut session = ScriptedSession::with_tables(&["users", "orders"]);
    let mut console = buffer_console();

    let outcome = Migrator::new("shop")
        .with_prelude(vec!["SET NAMES utf8mb4;".to_string()])
        .with_fixup(vec!["ANALYZE TABLE orders;".to_string()])
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap();

    assert_eq!(
        session.executed,
        vec![
            "SET NAMES utf8mb4;",
            ALTER_SHOP,
            "LOCK TABLES users WRITE,orders WRITE",
            "SET SESSION FOREIGN_KEY_CHECKS = 0;",
            ALTER_USERS,
            ALTER_ORDERS,
            "ANALYZE TABLE orders;",
            "SET SESSION FOREIGN_KEY_CHECKS = 1",
            "UNLOCK TABLES",
        ]
    );
    assert_eq!(outcome.mode, RunMode::Apply);
    assert!(outcome.statements.is_empty());
    assert_eq!(session.commits, 1);
}

#[tokio::test]
async fn test_foreign_key_checks_echoed() {
    let mut session = ScriptedSession::with_tables(&["users"]);
    let mut console = buffer_console();

    let outcome = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap();

    assert_eq!(
        session.queried,
        vec!["SELECT CAST(@@FOREIGN_KEY_CHECKS AS CHAR)"]
    );
    assert_eq!(outcome.foreign_key_checks.as_deref(), Some("0"));

    let output = console_text(console);
    assert!(output.contains("@@FOREIGN_KEY_CHECKS: 0\n"));
    // Apply mode never prints a plan
    assert!(!output.contains("===="));
}

#[tokio::test]
async fn test_rejected_table_is_isolated() {
    let mut session =
        ScriptedSession::with_tables(&["users", "orders", "payments"]).reject(ALTER_ORDERS);
    let mut console = buffer_console();

    let outcome = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap();

    assert_eq!(outcome.failed_tables, vec!["orders"]);
    assert!(!outcome.is_clean());
    assert!(session.executed.iter().any(|s| s == ALTER_USERS));
    assert!(
        session
            .executed
            .iter()
            .any(|s| s.starts_with("ALTER TABLE payments"))
    );
    assert_eq!(
        session.executed.last().map(String::as_str),
        Some("UNLOCK TABLES")
    );

    let output = console_text(console);
    assert!(output.contains("Cannot change column used in a foreign key"));
    assert!(output.contains("Failed tables:\n    - orders\n"));
}

#[tokio::test]
async fn test_orders_failure_reports_exactly_orders() {
    let mut session = ScriptedSession::with_tables(&["users", "orders"]).reject(ALTER_ORDERS);
    let mut console = buffer_console();

    let outcome = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap();

    assert_eq!(outcome.failed_tables, vec!["orders".to_string()]);
    let users_at = session.executed.iter().position(|s| s == ALTER_USERS);
    let orders_at = session.executed.iter().position(|s| s == ALTER_ORDERS);
    assert!(users_at.is_some());
    assert!(users_at < orders_at);
}

#[tokio::test]
async fn test_schema_rejection_aborts_without_cleanup_before_lock() {
    let mut session = ScriptedSession::with_tables(&["users"]).reject(ALTER_SHOP);
    let mut console = buffer_console();

    let err = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(err.is_statement_rejected());
    assert_eq!(session.executed, vec![ALTER_SHOP]);
    assert_eq!(session.commits, 0);
}

#[tokio::test]
async fn test_lock_failure_aborts_and_restores_session() {
    let mut session = ScriptedSession::with_tables(&["users", "orders"])
        .reject("LOCK TABLES users WRITE,orders WRITE");
    let mut console = buffer_console();

    let err = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(err.is_statement_rejected());
    assert_eq!(
        session.executed,
        vec![
            ALTER_SHOP,
            "LOCK TABLES users WRITE,orders WRITE",
            "SET SESSION FOREIGN_KEY_CHECKS = 1",
            "UNLOCK TABLES",
        ]
    );
}

#[tokio::test]
async fn test_transport_failure_during_table_is_fatal() {
    let mut session = ScriptedSession::with_tables(&["users", "orders"]).break_on(ALTER_USERS);
    let mut console = buffer_console();

    let err = Migrator::new("shop")
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::QueryExecution { .. }));
    assert!(!session.executed.iter().any(|s| s == ALTER_ORDERS));
    // Cleanup still runs after the fatal error
    assert_eq!(
        &session.executed[session.executed.len() - 2..],
        ["SET SESSION FOREIGN_KEY_CHECKS = 1", "UNLOCK TABLES"]
    );
}

#[tokio::test]
async fn test_fixup_failure_is_fatal_and_restores_session() {
    let mut session =
        ScriptedSession::with_tables(&["users"]).reject("ALTER TABLE orders ADD CONSTRAINT bad;");
    let mut console = buffer_console();

    let err = Migrator::new("shop")
        .with_fixup(vec!["ALTER TABLE orders ADD CONSTRAINT bad;".to_string()])
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(err.is_statement_rejected());
    assert_eq!(
        session.executed.last().map(String::as_str),
        Some("UNLOCK TABLES")
    );
    assert_eq!(session.commits, 0);
}

#[tokio::test]
async fn test_prelude_failure_aborts_before_listing() {
    let mut session = ScriptedSession::with_tables(&["users"]).reject("DROP TABLE nope;");
    let mut console = buffer_console();

    let err = Migrator::new("shop")
        .with_prelude(vec!["DROP TABLE nope;".to_string()])
        .run(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(err.is_statement_rejected());
    assert_eq!(session.executed, vec!["DROP TABLE nope;"]);
}

#[tokio::test]
async fn test_aborted_run_keeps_converted_tables() {
    let mut session = ScriptedSession::with_tables(&["users", "orders", "payments"])
        .reject(ALTER_USERS)
        .break_on(ALTER_ORDERS);
    let mut console = buffer_console();

    let aborted = Migrator::new("shop")
        .run_tracked(&mut session, &mut ApplyExecutor, &mut console)
        .await
        .unwrap_err();

    assert!(matches!(aborted.error, MigrateError::QueryExecution { .. }));
    assert_eq!(aborted.outcome.mode, RunMode::Apply);
    assert_eq!(aborted.outcome.tables, vec!["users", "orders", "payments"]);
    assert_eq!(aborted.outcome.failed_tables, vec!["users"]);
    assert!(aborted.outcome.converted_tables.is_empty());
}

#[tokio::test]
async fn test_aborted_apply_run_still_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let config = MigrationConfig::new(ConnectionConfig::new(
        "localhost".to_string(),
        "shop".to_string(),
    ))
    .with_apply(true)
    .with_report(Some(report_path.clone()));

    let mut session = ScriptedSession::with_tables(&["users", "orders"]).break_on(ALTER_ORDERS);
    let mut console = buffer_console();
    let err = migrate(&config, &mut session, &mut console)
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::QueryExecution { .. }));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["mode"], "apply");
    assert_eq!(report["converted_tables"], serde_json::json!(["users"]));
    assert_eq!(report["failed_tables"], serde_json::json!([]));
    assert!(
        report["aborted"]
            .as_str()
            .unwrap()
            .contains("ALTER TABLE orders")
    );
}

#[tokio::test]
async fn test_completed_run_report_has_no_abort_marker() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let config = MigrationConfig::new(ConnectionConfig::new(
        "localhost".to_string(),
        "shop".to_string(),
    ))
    .with_apply(true)
    .with_report(Some(report_path.clone()));

    let mut session = ScriptedSession::with_tables(&["users", "orders"]).reject(ALTER_ORDERS);
    let mut console = buffer_console();
    let outcome = migrate(&config, &mut session, &mut console).await.unwrap();

    assert_eq!(outcome.converted_tables, vec!["users"]);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(report.get("aborted").is_none());
    assert_eq!(report["failed_tables"], serde_json::json!(["orders"]));
}

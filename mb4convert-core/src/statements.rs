//! SQL text for every statement a run emits.
//!
//! Identifiers are emitted unquoted, exactly as the operator supplied them or
//! the server listed them.

/// Character set every schema and table is converted to
pub const TARGET_CHARSET: &str = "utf8mb4";

/// Collation every schema and table is converted to
pub const TARGET_COLLATION: &str = "utf8mb4_general_ci";

/// Disables implicit commits for the session.
pub const DISABLE_AUTOCOMMIT: &str = "SET autocommit = 0";

/// Turns foreign key enforcement off so tables can be converted one by one.
pub const DISABLE_FOREIGN_KEY_CHECKS: &str = "SET SESSION FOREIGN_KEY_CHECKS = 0;";

/// Turns foreign key enforcement back on.
pub const ENABLE_FOREIGN_KEY_CHECKS: &str = "SET SESSION FOREIGN_KEY_CHECKS = 1";

/// Releases the locks taken by [`lock_tables`].
pub const UNLOCK_TABLES: &str = "UNLOCK TABLES";

/// Reads the session's foreign key check flag back.
// CAST keeps the value textual on servers that report system variables as integers
pub const FOREIGN_KEY_CHECKS_QUERY: &str = "SELECT CAST(@@FOREIGN_KEY_CHECKS AS CHAR)";

/// Changes the schema defaults.
///
/// ```rust
/// use mb4convert_core::statements::alter_schema;
///
/// assert_eq!(
///     alter_schema("shop"),
///     "ALTER SCHEMA shop DEFAULT CHARACTER SET utf8mb4 DEFAULT COLLATE utf8mb4_general_ci;"
/// );
/// ```
pub fn alter_schema(database: &str) -> String {
    format!(
        "ALTER SCHEMA {} DEFAULT CHARACTER SET {} DEFAULT COLLATE {};",
        database, TARGET_CHARSET, TARGET_COLLATION
    )
}

/// Write-locks every table in one statement.
///
/// Returns `None` for an empty list since `LOCK TABLES` needs at least one
/// table.
pub fn lock_tables<S: AsRef<str>>(tables: &[S]) -> Option<String> {
    if tables.is_empty() {
        return None;
    }

    let locks: Vec<String> = tables
        .iter()
        .map(|table| format!("{} WRITE", table.as_ref()))
        .collect();

    Some(format!("LOCK TABLES {}", locks.join(",")))
}

/// Converts a table's columns and defaults.
pub fn convert_table(table: &str) -> String {
    format!(
        "ALTER TABLE {} CONVERT TO CHARACTER SET {} COLLATE {};",
        table, TARGET_CHARSET, TARGET_COLLATION
    )
}

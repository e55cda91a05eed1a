//! Prelude and fixup SQL files.
//!
//! One statement per line. Blank lines and lines starting with `--` are
//! skipped; statements cannot span lines.

use crate::Result;
use crate::error::MigrateError;
use std::path::Path;

/// Comment marker recognised at the start of a line
const COMMENT_PREFIX: &str = "--";

/// Extracts the statements from hook file contents, in file order.
///
/// ```rust
/// use mb4convert_core::hooks::parse_hook_statements;
///
/// let sql = "-- drop the fk first\n\nALTER TABLE orders DROP FOREIGN KEY fk_user;\n";
/// assert_eq!(
///     parse_hook_statements(sql),
///     vec!["ALTER TABLE orders DROP FOREIGN KEY fk_user;"]
/// );
/// ```
pub fn parse_hook_statements(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .map(str::to_string)
        .collect()
}

/// Reads and parses a hook file.
///
/// # Errors
/// Returns [`MigrateError::Io`] when the file cannot be read
pub async fn load_hook_file(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io("read hook file", path, e))?;

    let statements = parse_hook_statements(&contents);
    tracing::info!(
        "Loaded {} statements from {}",
        statements.len(),
        path.display()
    );
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let contents = "\n   \n-- comment\n  -- indented comment\nSELECT 1;\n\t\nSELECT 2;";
        assert_eq!(
            parse_hook_statements(contents),
            vec!["SELECT 1;", "SELECT 2;"]
        );
    }

    #[test]
    fn test_only_comments_yields_nothing() {
        assert!(parse_hook_statements("-- a\n--b\n\n").is_empty());
        assert!(parse_hook_statements("").is_empty());
    }

    #[test]
    fn test_trailing_comment_is_part_of_statement() {
        assert_eq!(
            parse_hook_statements("SELECT 1; -- keep"),
            vec!["SELECT 1; -- keep"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            parse_hook_statements("SELECT 1;\r\n-- x\r\nSELECT 2;\r\n"),
            vec!["SELECT 1;", "SELECT 2;"]
        );
    }

    #[tokio::test]
    async fn test_load_hook_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-- re-add constraints").unwrap();
        writeln!(
            file,
            "ALTER TABLE orders ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users(id);"
        )
        .unwrap();

        let statements = load_hook_file(file.path()).await.unwrap();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("ALTER TABLE orders ADD CONSTRAINT"));
    }

    #[tokio::test]
    async fn test_load_missing_hook_file() {
        let err = load_hook_file(Path::new("/nonexistent/prelude.sql"))
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/prelude.sql"));
    }
}

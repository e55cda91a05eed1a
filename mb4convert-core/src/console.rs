//! Operator-facing console output.
//!
//! Status lines, the failed-table list and the final plan go to stdout;
//! diagnostics go through `tracing` to stderr. Styling is plain ANSI and is
//! switched off when stdout is not a terminal or `NO_COLOR` is set.

use crate::Result;
use crate::error::MigrateError;
use crate::statements::TARGET_COLLATION;
use std::io::{IsTerminal, Write};

// ANSI color codes
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Width of the rule printed between plan statements
pub const PLAN_RULE_WIDTH: usize = 80;

/// Renders a plan: every statement framed by rules of `=`.
///
/// ```rust
/// use mb4convert_core::console::render_plan;
///
/// let rule = "=".repeat(80);
/// let plan = render_plan(&["UNLOCK TABLES".to_string()]);
/// assert_eq!(plan, format!("{rule}\nUNLOCK TABLES\n{rule}\n"));
/// ```
pub fn render_plan(statements: &[String]) -> String {
    let rule = "=".repeat(PLAN_RULE_WIDTH);
    let mut rendered = format!("{}\n", rule);
    for statement in statements {
        rendered.push_str(statement);
        rendered.push('\n');
        rendered.push_str(&rule);
        rendered.push('\n');
    }
    rendered
}

/// Styled writer for run progress.
#[derive(Debug)]
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<std::io::Stdout> {
    /// Console on stdout, colored when attached to a terminal.
    pub fn stdout() -> Self {
        let out = std::io::stdout();
        let color = out.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::new(out, color)
    }
}

impl<W: Write> Console<W> {
    /// Wraps any writer.
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, style: &str, text: &str) -> Result<()> {
        let written = if self.color && !style.is_empty() {
            writeln!(self.out, "{}{}{}", style, text, RESET)
        } else {
            writeln!(self.out, "{}", text)
        };
        written.map_err(console_error)
    }

    /// Announces the schema being converted.
    pub fn headline(&mut self, database: &str) -> Result<()> {
        self.line(
            BOLD,
            &format!("Changing {} collation to {}", database, TARGET_COLLATION),
        )
    }

    /// Reports the table about to be converted.
    pub fn table_progress(&mut self, table: &str) -> Result<()> {
        self.line(
            GREEN,
            &format!("Changing table {table} collation to {TARGET_COLLATION}"),
        )
    }

    /// Prints the server's reason for refusing a table conversion.
    pub fn table_rejected(&mut self, detail: &str) -> Result<()> {
        self.line(RED, detail)
    }

    /// Echoes the session's foreign key check value.
    pub fn foreign_key_checks(&mut self, value: Option<&str>) -> Result<()> {
        self.line(
            YELLOW,
            &format!("@@FOREIGN_KEY_CHECKS: {}", value.unwrap_or("NULL")),
        )
    }

    /// Prints the failed-table list, which may be empty.
    pub fn failed_tables(&mut self, tables: &[String]) -> Result<()> {
        self.line(BOLD, "Failed tables:")?;
        for table in tables {
            self.line(RED, &format!("    - {}", table))?;
        }
        Ok(())
    }

    /// Prints the accumulated plan for manual review.
    pub fn plan(&mut self, statements: &[String]) -> Result<()> {
        self.out
            .write_all(render_plan(statements).as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(console_error)
    }
}

fn console_error(source: std::io::Error) -> MigrateError {
    MigrateError::Io {
        context: "Failed to write console output".to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_lines() {
        let mut console = Console::new(Vec::new(), false);
        console.headline("shop").unwrap();
        console.table_progress("users").unwrap();
        console.foreign_key_checks(Some("0")).unwrap();

        assert_eq!(
            output(console),
            "Changing shop collation to utf8mb4_general_ci\n\
             Changing table users collation to utf8mb4_general_ci\n\
             @@FOREIGN_KEY_CHECKS: 0\n"
        );
    }

    #[test]
    fn test_colored_lines_reset_style() {
        let mut console = Console::new(Vec::new(), true);
        console.table_rejected("Cannot change column").unwrap();

        assert_eq!(output(console), "\x1b[31mCannot change column\x1b[0m\n");
    }

    #[test]
    fn test_failed_tables_list() {
        let mut console = Console::new(Vec::new(), false);
        console
            .failed_tables(&["orders".to_string(), "audit".to_string()])
            .unwrap();

        assert_eq!(
            output(console),
            "Failed tables:\n    - orders\n    - audit\n"
        );
    }

    #[test]
    fn test_failed_tables_empty_still_prints_heading() {
        let mut console = Console::new(Vec::new(), false);
        console.failed_tables(&[]).unwrap();
        assert_eq!(output(console), "Failed tables:\n");
    }

    #[test]
    fn test_render_plan_separates_statements() {
        let rule = "=".repeat(PLAN_RULE_WIDTH);
        let plan = render_plan(&["A;".to_string(), "B;".to_string()]);
        assert_eq!(plan, format!("{rule}\nA;\n{rule}\nB;\n{rule}\n"));
    }

    #[test]
    fn test_render_empty_plan() {
        assert_eq!(
            render_plan(&[]),
            format!("{}\n", "=".repeat(PLAN_RULE_WIDTH))
        );
    }
}

//! Output formatting for `hedgebets` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    println!("{}", render_items(items, mode)?);
    Ok(())
}

fn render_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<String> {
    Ok(match mode {
        OutputMode::Table if items.is_empty() => "(no results)".to_string(),
        OutputMode::Table => Table::new(items).to_string(),
        OutputMode::Json => serde_json::to_string_pretty(items)?,
    })
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m{msg}\x1b[0m");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        team: String,
    }

    #[test]
    fn test_empty_table_placeholder() {
        let rows: Vec<Row> = vec![];
        assert_eq!(render_items(&rows, OutputMode::Table).unwrap(), "(no results)");
        assert_eq!(render_items(&rows, OutputMode::Json).unwrap(), "[]");
    }

    #[test]
    fn test_table_contains_header_and_value() {
        let rows = vec![Row { team: "KC".into() }];
        let table = render_items(&rows, OutputMode::Table).unwrap();
        assert!(table.contains("team"));
        assert!(table.contains("KC"));
    }
}

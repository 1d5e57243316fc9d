/// Query Execution Module
///
/// This module holds the diagnostic table dump and the SQL helper functions
/// registered on directory connections.

use crate::core::db::schema::DirectoryTable;
use crate::core::Result;
use rusqlite::functions::FunctionFlags;
use rusqlite::{types::ValueRef, Connection};
use serde::Serialize;
use tracing::debug;

/// Width of the rule framing a rendered table dump.
const RULE_WIDTH: usize = 50;

/// All rows of one directory table, formatted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDump {
    /// Table the rows were read from
    pub table: DirectoryTable,
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
}

impl TableDump {
    /// Renders the dump as a header line and ` | `-separated rows framed by rules.
    pub fn render(&self) -> String {
        let rule = "-".repeat(RULE_WIDTH);
        let mut output = String::new();
        output.push_str(&format!("Rows of table {}:\n", self.table));
        output.push_str(&rule);
        output.push('\n');
        output.push_str(&self.columns.join(" | "));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&row.join(" | "));
            output.push('\n');
        }
        output.push_str(&rule);
        output.push('\n');
        output
    }

    /// Serializes the dump as a JSON array of column-keyed objects.
    pub fn to_json(&self) -> Result<String> {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(serde_json::Value::String))
                    .collect()
            })
            .collect();
        Ok(serde_json::to_string_pretty(&objects)?)
    }
}

/// Reads every row of `table` with its column headers.
///
/// Only tables named by `DirectoryTable` can be dumped, so the table name
/// interpolated into the statement never comes from caller input.
pub fn dump_table(conn: &Connection, table: DirectoryTable) -> Result<TableDump> {
    let sql = format!("SELECT * FROM {} ORDER BY id", table.name());
    let mut stmt = conn.prepare(&sql)?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = stmt.column_count();

    let rows = stmt
        .query_map([], |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(format_value(row.get_ref(i)?));
            }
            Ok(values)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!("Dumped {} rows from {}", rows.len(), table);
    Ok(TableDump {
        table,
        columns,
        rows,
    })
}

/// Registers the scalar SQL functions the directory queries rely on.
///
/// `contains_ci(haystack, needle)` is a Unicode-aware, case-insensitive
/// substring test. NULL in either argument yields NULL. Registering again
/// replaces the previous definition.
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "contains_ci",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => Some(contains_ignore_case(&h, &n)),
                _ => None,
            })
        },
    )?;
    Ok(())
}

/// Case-insensitive containment using full Unicode lowercasing.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Formats a SQLite value for display
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

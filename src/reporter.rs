use std::fmt;
use std::io::Write;

use rusqlite::types::Value;
use tracing::info;

use crate::database::BankDatabase;
use crate::error::{EtlError, Result};

/// Columns and rows returned by a report query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 => format!("{:.1}", f),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Dataframe-style table: a leading row index, then every column
/// right-aligned under its header.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty DataFrame")?;
            writeln!(f, "Columns: [{}]", self.columns.join(", "))?;
            return write!(f, "Index: []");
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(format_value).collect())
            .collect();

        let index_width = (self.rows.len() - 1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }

        for (i, row) in cells.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<index_width$}", i)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
        }
        Ok(())
    }
}

/// The three fixed report statements for `table_name`
pub fn report_queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * FROM {}", table_name),
        format!("SELECT AVG(MC_GBP_Billion) FROM {}", table_name),
        format!("SELECT Name from {} LIMIT 5", table_name),
    ]
}

fn console_error(e: std::io::Error) -> EtlError {
    EtlError::Write {
        path: "<stdout>".into(),
        reason: e.to_string(),
    }
}

/// Print the statement, prefixed with `=>`, then run it and print its result.
/// The statement is echoed even when the query fails.
pub fn run_query<W: Write>(database: &BankDatabase, statement: &str, out: &mut W) -> Result<QueryResult> {
    writeln!(out, "=>{}", statement).map_err(console_error)?;
    let result = database.query(statement)?;
    writeln!(out, "{}", result).map_err(console_error)?;
    info!("Query returned {} rows: {}", result.rows.len(), statement);
    Ok(result)
}

/// Run every report query in order
pub fn run_reports<W: Write>(database: &BankDatabase, table_name: &str, out: &mut W) -> Result<Vec<QueryResult>> {
    report_queries(table_name)
        .iter()
        .map(|statement| run_query(database, statement, out))
        .collect()
}

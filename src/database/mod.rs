use std::path::Path;

use rusqlite::{params, types::Value, Connection};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{EnrichedBankRecord, BANK_COLUMNS};
use crate::reporter::QueryResult;

/// Quote an SQL identifier, doubling any embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite store holding the bank table.
///
/// The connection is closed when the value is dropped, so every exit path
/// of a run releases it.
pub struct BankDatabase {
    connection: Connection,
}

impl BankDatabase {
    /// Open (creating if needed) the database file at `database_path`
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self> {
        let database_path = database_path.as_ref();
        let connection = Connection::open(database_path)?;
        info!("Database opened at {}", database_path.display());
        Ok(Self { connection })
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            connection: Connection::open_in_memory()?,
        })
    }

    /// Drop and recreate `table_name`, then insert `banks` in order.
    /// Runs in one transaction; returns the number of rows written.
    pub fn replace_table(&mut self, table_name: &str, banks: &[EnrichedBankRecord]) -> Result<usize> {
        let table = quote_ident(table_name);
        let tx = self.connection.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(
            &format!(
                "CREATE TABLE {} (
                    {} TEXT,
                    {} REAL,
                    {} REAL,
                    {} REAL,
                    {} REAL
                )",
                table,
                BANK_COLUMNS[0],
                BANK_COLUMNS[1],
                BANK_COLUMNS[2],
                BANK_COLUMNS[3],
                BANK_COLUMNS[4]
            ),
            [],
        )?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                table,
                BANK_COLUMNS.join(", ")
            ))?;
            for bank in banks {
                stmt.execute(params![
                    bank.name,
                    bank.market_cap_usd_billion,
                    bank.market_cap_gbp_billion,
                    bank.market_cap_eur_billion,
                    bank.market_cap_inr_billion
                ])?;
            }
        }
        tx.commit()?;

        info!("Replaced table {} with {} rows", table_name, banks.len());
        Ok(banks.len())
    }

    /// Read the bank table back in insertion order
    pub fn read_banks(&self, table_name: &str) -> Result<Vec<EnrichedBankRecord>> {
        let mut stmt = self.connection.prepare(&format!(
            "SELECT {} FROM {} ORDER BY rowid",
            BANK_COLUMNS.join(", "),
            quote_ident(table_name)
        ))?;

        let banks = stmt
            .query_map([], |row| {
                Ok(EnrichedBankRecord {
                    name: row.get(0)?,
                    market_cap_usd_billion: row.get(1)?,
                    market_cap_gbp_billion: row.get(2)?,
                    market_cap_eur_billion: row.get(3)?,
                    market_cap_inr_billion: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(banks)
    }

    /// Run an arbitrary read statement and collect every row
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        debug!("Executing: {}", sql);
        let mut stmt = self.connection.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(QueryResult { columns, rows })
    }

    /// Close the connection, reporting any error instead of swallowing it
    /// as `Drop` would.
    pub fn close(self) -> Result<()> {
        self.connection.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

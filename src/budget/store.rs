//! Ledger persistence
//!
//! Spending must survive process restarts or the daily cap means nothing.
//! The SQLite store keeps one row per day plus one row per (day, operation)
//! pair and rewrites both on every save; ledgers are small enough that
//! replacing beats diffing.

use crate::budget::ledger::{BudgetLedger, OperationUsage};
use crate::LedgerError;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistence seam for daily ledgers
pub trait LedgerStore: Send {
    /// Loads one day's ledger, if it was ever saved
    fn load_day(&self, date: NaiveDate) -> Result<Option<BudgetLedger>, LedgerError>;

    /// Saves one day's ledger, replacing any previous state for that day
    fn save_day(&mut self, ledger: &BudgetLedger) -> Result<(), LedgerError>;
}

/// SQLite-backed ledger store
pub struct SqliteLedgerStore {
    conn: Connection,
}

impl SqliteLedgerStore {
    /// Opens (or creates) the ledger database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self { conn })
    }

    fn initialize(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ledger_days (
                date        TEXT PRIMARY KEY,
                total_calls INTEGER NOT NULL,
                total_cost  REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ledger_operations (
                date      TEXT NOT NULL,
                operation TEXT NOT NULL,
                calls     INTEGER NOT NULL,
                cost      REAL NOT NULL,
                PRIMARY KEY (date, operation)
            );",
        )?;
        Ok(())
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load_day(&self, date: NaiveDate) -> Result<Option<BudgetLedger>, LedgerError> {
        let key = date.format(DATE_FORMAT).to_string();

        let day = self
            .conn
            .query_row(
                "SELECT total_calls, total_cost FROM ledger_days WHERE date = ?1",
                params![key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let (total_calls, total_cost) = match day {
            Some(day) => day,
            None => return Ok(None),
        };

        let mut ledger = BudgetLedger::new(date);
        ledger.total_calls = total_calls as u64;
        ledger.total_cost = total_cost;

        let mut stmt = self.conn.prepare(
            "SELECT operation, calls, cost FROM ledger_operations WHERE date = ?1",
        )?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        for row in rows {
            let (operation, calls, cost) = row?;
            ledger.operations.insert(
                operation,
                OperationUsage {
                    calls: calls as u64,
                    cost,
                },
            );
        }

        Ok(Some(ledger))
    }

    fn save_day(&mut self, ledger: &BudgetLedger) -> Result<(), LedgerError> {
        let key = ledger.date.format(DATE_FORMAT).to_string();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO ledger_days (date, total_calls, total_cost)
             VALUES (?1, ?2, ?3)",
            params![key, ledger.total_calls as i64, ledger.total_cost],
        )?;
        tx.execute(
            "DELETE FROM ledger_operations WHERE date = ?1",
            params![key],
        )?;
        for (operation, usage) in &ledger.operations {
            tx.execute(
                "INSERT INTO ledger_operations (date, operation, calls, cost)
                 VALUES (?1, ?2, ?3, ?4)",
                params![key, operation, usage.calls as i64, usage.cost],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_missing_day() {
        let store = SqliteLedgerStore::open_in_memory().unwrap();
        assert!(store.load_day(day(2024, 3, 15)).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = SqliteLedgerStore::open_in_memory().unwrap();
        let mut ledger = BudgetLedger::new(day(2024, 3, 15));
        ledger.record("categorize", 20, 0.06);
        ledger.record("summarize", 3, 0.03);

        store.save_day(&ledger).unwrap();
        let loaded = store.load_day(day(2024, 3, 15)).unwrap().unwrap();

        assert_eq!(loaded.total_calls, 23);
        assert!((loaded.total_cost - 0.09).abs() < 1e-9);
        assert_eq!(loaded.operations["categorize"].calls, 20);
        assert!((loaded.operations["summarize"].cost - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_save_replaces_previous_state() {
        let mut store = SqliteLedgerStore::open_in_memory().unwrap();
        let mut ledger = BudgetLedger::new(day(2024, 3, 15));
        ledger.record("categorize", 1, 0.003);
        store.save_day(&ledger).unwrap();

        ledger.record("categorize", 1, 0.003);
        store.save_day(&ledger).unwrap();

        let loaded = store.load_day(day(2024, 3, 15)).unwrap().unwrap();
        assert_eq!(loaded.total_calls, 2);
        assert_eq!(loaded.operations.len(), 1);
    }

    #[test]
    fn test_days_are_independent() {
        let mut store = SqliteLedgerStore::open_in_memory().unwrap();
        let mut monday = BudgetLedger::new(day(2024, 3, 18));
        monday.record("summarize", 1, 0.01);
        store.save_day(&monday).unwrap();

        assert!(store.load_day(day(2024, 3, 19)).unwrap().is_none());
        assert_eq!(
            store.load_day(day(2024, 3, 18)).unwrap().unwrap().total_calls,
            1
        );
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let mut store = SqliteLedgerStore::open(&path).unwrap();
            let mut ledger = BudgetLedger::new(day(2024, 3, 15));
            ledger.record("categorize", 7, 0.021);
            store.save_day(&ledger).unwrap();
        }

        let store = SqliteLedgerStore::open(&path).unwrap();
        let loaded = store.load_day(day(2024, 3, 15)).unwrap().unwrap();
        assert_eq!(loaded.total_calls, 7);
    }
}

//! SQLite-backed ledger port.
//!
//! # Responsibility
//! - Keep SQL details for the `transactions` table inside the storage boundary.
//! - Map SQLite row ids to store handles.
//!
//! # Invariants
//! - Handles are `AUTOINCREMENT` row ids, so a deleted id is never handed out
//!   again, even across restarts.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{open_db, open_db_in_memory};
use crate::model::record::{Entry, Handle};
use crate::model::transaction::{format_date, parse_date, Transaction, TransactionKind};
use crate::storage::{StorageError, StoragePort, StorageResult};
use rusqlite::{params, Connection, Row};
use std::path::Path;

const TRANSACTION_SELECT_SQL: &str = "SELECT
    id,
    type,
    amount,
    date,
    description
FROM transactions
ORDER BY id ASC;";

/// Ledger port owning its SQLite connection; the connection closes on drop.
pub struct SqliteTransactionStorage {
    conn: Connection,
}

impl SqliteTransactionStorage {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StoragePort<Transaction> for SqliteTransactionStorage {
    fn read_all(&mut self) -> StorageResult<Vec<Entry<Transaction>>> {
        let mut stmt = self.conn.prepare(TRANSACTION_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_transaction_row(row)?);
        }

        Ok(entries)
    }

    fn insert(&mut self, record: &Transaction) -> StorageResult<Handle> {
        self.conn.execute(
            "INSERT INTO transactions (type, amount, date, description)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.kind.as_str(),
                record.amount,
                format_date(record.date),
                record.description.as_str(),
            ],
        )?;

        handle_from_row_id(self.conn.last_insert_rowid())
    }

    fn update(&mut self, handle: Handle, record: &Transaction) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET
                type = ?1,
                amount = ?2,
                date = ?3,
                description = ?4
             WHERE id = ?5;",
            params![
                record.kind.as_str(),
                record.amount,
                format_date(record.date),
                record.description.as_str(),
                row_id_from_handle(handle)?,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::MissingRow(handle));
        }
        Ok(())
    }

    fn delete(&mut self, handle: Handle) -> StorageResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1;",
            [row_id_from_handle(handle)?],
        )?;

        if changed == 0 {
            return Err(StorageError::MissingRow(handle));
        }
        Ok(())
    }
}

fn parse_transaction_row(row: &Row<'_>) -> StorageResult<Entry<Transaction>> {
    let id: i64 = row.get("id")?;
    let handle = handle_from_row_id(id)?;

    let type_text: Option<String> = row.get("type")?;
    let kind = type_text
        .as_deref()
        .and_then(|value| value.parse::<TransactionKind>().ok())
        .ok_or_else(|| {
            StorageError::InvalidData(format!(
                "invalid type `{}` in transactions.type for id {id}",
                type_text.as_deref().unwrap_or("NULL")
            ))
        })?;

    let amount: Option<f64> = row.get("amount")?;
    let amount = amount.filter(|value| value.is_finite()).ok_or_else(|| {
        StorageError::InvalidData(format!("invalid amount in transactions.amount for id {id}"))
    })?;

    let date_text: Option<String> = row.get("date")?;
    let date = date_text.as_deref().and_then(parse_date).ok_or_else(|| {
        StorageError::InvalidData(format!(
            "invalid date `{}` in transactions.date for id {id}",
            date_text.as_deref().unwrap_or("NULL")
        ))
    })?;

    let description: Option<String> = row.get("description")?;

    Ok(Entry::new(
        handle,
        Transaction::new(kind, amount, date, description.unwrap_or_default()),
    ))
}

fn handle_from_row_id(id: i64) -> StorageResult<Handle> {
    u64::try_from(id)
        .map(Handle::new)
        .map_err(|_| StorageError::InvalidData(format!("negative row id {id}")))
}

fn row_id_from_handle(handle: Handle) -> StorageResult<i64> {
    i64::try_from(handle.get())
        .map_err(|_| StorageError::InvalidData(format!("handle {handle} exceeds row id range")))
}

//! Ledger schema migrations.
//!
//! # Responsibility
//! - Bring a ledger file to the latest schema inside one transaction.
//! - Adopt ledgers written before `PRAGMA user_version` was tracked.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - An unversioned ledger is adopted only if its `transactions` table has
//!   every column the storage port reads; otherwise nothing is written.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::{Connection, Transaction};

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_transactions.sql"),
}];

/// Columns the ledger port selects, in table order.
pub const LEDGER_COLUMNS: &[&str] = &["id", "type", "amount", "date", "description"];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on `conn`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `LegacySchemaMismatch` when an unversioned `transactions` table lacks
///   ledger columns.
/// - `Sqlite` when a statement fails; the file is left as it was.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let legacy_rows = if from_version == 0 {
        adopt_unversioned_ledger(&tx)?
    } else {
        None
    };
    for migration in MIGRATIONS.iter().skip_while(|m| m.version <= from_version) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    match legacy_rows {
        Some(rows) => info!(
            "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} legacy_rows={rows}"
        ),
        None => info!(
            "event=db_migrate module=db status=ok from_version={from_version} to_version={latest}"
        ),
    }
    Ok(())
}

/// Checks a pre-existing `transactions` table and returns its row count, or
/// `None` when the file has no ledger table yet.
fn adopt_unversioned_ledger(tx: &Transaction<'_>) -> DbResult<Option<i64>> {
    let columns = table_columns(tx, "transactions")?;
    if columns.is_empty() {
        return Ok(None);
    }

    let missing: Vec<&'static str> = LEDGER_COLUMNS
        .iter()
        .copied()
        .filter(|wanted| !columns.iter().any(|column| column.eq_ignore_ascii_case(wanted)))
        .collect();
    if !missing.is_empty() {
        warn!(
            "event=db_migrate module=db status=error error_code=legacy_schema_mismatch missing={}",
            missing.join(",")
        );
        return Err(DbError::LegacySchemaMismatch { missing });
    }

    let rows = tx.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
    Ok(Some(rows))
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

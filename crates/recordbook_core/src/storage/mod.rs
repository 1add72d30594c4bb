//! Storage ports behind the record store.
//!
//! # Responsibility
//! - Define the `StoragePort` contract the store writes through.
//! - Provide flat-file, SQLite and in-memory implementations.
//!
//! # Invariants
//! - Ports assign handles; a handle is never reused by the same port instance.
//! - `read_all` after any sequence of successful mutations reflects exactly
//!   those mutations, in insertion order.
//! - A failed mutation leaves persisted state as it was.

use crate::db::DbError;
use crate::model::record::{Entry, Handle};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod flat_file;
pub mod memory;
pub mod sqlite;

pub use flat_file::FlatFileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteTransactionStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Transport-level failure of a storage port.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Db(DbError),
    /// Persisted state cannot be decoded into a valid record.
    InvalidData(String),
    /// The port has no row for a handle the caller expected to exist.
    MissingRow(Handle),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRow(handle) => write!(f, "no persisted row for handle {handle}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRow(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable backing collection for one record shape.
pub trait StoragePort<R> {
    /// Loads every persisted record in insertion order.
    fn read_all(&mut self) -> StorageResult<Vec<Entry<R>>>;
    /// Persists a new record and returns the handle assigned to it.
    fn insert(&mut self, record: &R) -> StorageResult<Handle>;
    /// Replaces the persisted record for `handle`.
    fn update(&mut self, handle: Handle, record: &R) -> StorageResult<()>;
    /// Removes the persisted record for `handle`.
    fn delete(&mut self, handle: Handle) -> StorageResult<()>;
}

//! Core record-store logic behind the contact book and finance tracker.
//!
//! Both applications are thin callers of `RecordStore`: validated records,
//! stable handles, write-through persistence and aggregate views.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact::Contact;
pub use model::record::{Entry, Handle, Record, ValidationError, ValidationReason};
pub use model::transaction::{balance, Transaction, TransactionForm, TransactionKind};
pub use service::contact_book::{contact_error_message, ContactBook, ContactRow};
pub use service::finance::{finance_error_message, ChartSlice, Dashboard, FinanceTracker};
pub use storage::{
    FlatFileStorage, MemoryStorage, SqliteTransactionStorage, StorageError, StoragePort,
    StorageResult,
};
pub use store::{Aggregate, RecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

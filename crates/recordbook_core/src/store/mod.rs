//! In-memory record store with write-through persistence.
//!
//! # Responsibility
//! - Own the authoritative ordered collection for one record shape.
//! - Validate every write and persist it through a `StoragePort`.
//! - Answer list and aggregate queries for presentation layers.
//!
//! # Invariants
//! - Every record in the collection passed `Record::validate()` at its last write.
//! - Storage is written first; memory changes only after the port succeeds.
//! - Handles come from the port and are never recomputed from position.
//! - After a failed `load` the store is read-only until a later `load`
//!   succeeds, so unread rows are never rewritten or shadowed.

use crate::model::record::{Entry, Handle, Record, ValidationError};
use crate::storage::{StorageError, StoragePort};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod aggregate;

pub use aggregate::Aggregate;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a record store operation.
#[derive(Debug)]
pub enum StoreError {
    /// User-correctable input defect.
    Validation(ValidationError),
    /// The handle is not (or no longer) part of the collection.
    NotFound(Handle),
    /// Load failed; the store stays empty and refuses writes.
    StorageUnavailable(StorageError),
    /// A write through the port failed; memory was left unchanged.
    PersistFailure(StorageError),
    /// Caller passed an argument the store cannot interpret.
    InvalidArgument(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(handle) => write!(f, "record not found: {handle}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::PersistFailure(err) => write!(f, "failed to persist change: {err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageUnavailable(err) | Self::PersistFailure(err) => Some(err),
            Self::NotFound(_) | Self::InvalidArgument(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordered, validated collection of one record shape.
///
/// Mutations take `&mut self`; hosts sharing a store across threads must wrap
/// it in their own lock.
pub struct RecordStore<R: Record, P: StoragePort<R>> {
    port: P,
    entries: Vec<Entry<R>>,
    degraded: bool,
}

impl<R: Record, P: StoragePort<R>> RecordStore<R, P> {
    /// Creates an empty store over `port`. Call `load` to read persisted rows.
    pub fn new(port: P) -> Self {
        Self {
            port,
            entries: Vec::new(),
            degraded: false,
        }
    }

    /// Creates a store and loads it, logging and swallowing load failures.
    ///
    /// The returned store is empty when the port could not be read.
    pub fn open(port: P) -> Self {
        let mut store = Self::new(port);
        if let Err(err) = store.load() {
            warn!(
                "event=store_open module=store status=degraded shape={} error={}",
                R::SHAPE,
                err
            );
        }
        store
    }

    /// Replaces the collection with the port's persisted rows.
    ///
    /// # Errors
    /// - `StorageUnavailable` when the port cannot be read or holds an invalid
    ///   row; the collection is left empty and writes are refused.
    pub fn load(&mut self) -> StoreResult<Vec<Entry<R>>> {
        self.entries.clear();
        self.degraded = true;
        let rows = match self.port.read_all() {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error shape={} error={}",
                    R::SHAPE,
                    err
                );
                return Err(StoreError::StorageUnavailable(err));
            }
        };

        if let Some(invalid) = rows.iter().find_map(|entry| entry.record.validate().err()) {
            error!(
                "event=store_load module=store status=error shape={} error_code=invalid_row field={}",
                R::SHAPE,
                invalid.field
            );
            return Err(StoreError::StorageUnavailable(StorageError::InvalidData(
                invalid.to_string(),
            )));
        }

        self.entries = rows;
        self.degraded = false;
        info!(
            "event=store_load module=store status=ok shape={} rows={}",
            R::SHAPE,
            self.entries.len()
        );
        Ok(self.list())
    }

    /// Validates and persists a new record, returning its handle.
    pub fn add(&mut self, record: R) -> StoreResult<Handle> {
        self.ensure_writable("add")?;
        record.validate()?;
        let handle = self
            .port
            .insert(&record)
            .map_err(|err| persist_failure::<R>("add", err))?;
        self.entries.push(Entry::new(handle, record));
        debug!(
            "event=store_add module=store status=ok shape={} handle={}",
            R::SHAPE,
            handle
        );
        Ok(handle)
    }

    pub fn get(&self, handle: Handle) -> StoreResult<&R> {
        self.position(handle)
            .map(|index| &self.entries[index].record)
    }

    /// Replaces the record behind `handle` wholesale.
    ///
    /// # Errors
    /// - `NotFound` is checked before validation.
    /// - `Validation` and `PersistFailure` leave the old record in place.
    pub fn update(&mut self, handle: Handle, record: R) -> StoreResult<()> {
        let index = self.position(handle)?;
        self.ensure_writable("update")?;
        record.validate()?;
        self.port
            .update(handle, &record)
            .map_err(|err| persist_failure::<R>("update", err))?;
        self.entries[index].record = record;
        debug!(
            "event=store_update module=store status=ok shape={} handle={}",
            R::SHAPE,
            handle
        );
        Ok(())
    }

    /// Deletes the record behind `handle` and returns it.
    pub fn remove(&mut self, handle: Handle) -> StoreResult<R> {
        let index = self.position(handle)?;
        self.ensure_writable("remove")?;
        self.port
            .delete(handle)
            .map_err(|err| persist_failure::<R>("remove", err))?;
        let entry = self.entries.remove(index);
        debug!(
            "event=store_remove module=store status=ok shape={} handle={}",
            R::SHAPE,
            handle
        );
        Ok(entry.record)
    }

    /// Snapshot of the collection in insertion order.
    pub fn list(&self) -> Vec<Entry<R>> {
        self.entries.clone()
    }

    /// Borrowing view of the collection in insertion order.
    pub fn entries(&self) -> &[Entry<R>] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.position(handle).is_ok()
    }

    /// Sums `Record::measure()` per value of `group_by` over records passing
    /// `filter`.
    ///
    /// # Errors
    /// - `InvalidArgument` when `group_by` is not a field of the shape.
    pub fn aggregate(&self, group_by: &str, filter: impl Fn(&R) -> bool) -> StoreResult<Aggregate> {
        if !R::FIELDS.iter().any(|field| *field == group_by) {
            return Err(StoreError::InvalidArgument(format!(
                "unknown {} field `{group_by}`; expected one of {}",
                R::SHAPE,
                R::FIELDS.join("|")
            )));
        }

        let mut aggregate = Aggregate::new();
        for record in self.records().filter(|record| filter(*record)) {
            let key = record.group_key(group_by).ok_or_else(|| {
                StoreError::InvalidArgument(format!("{} field `{group_by}` has no group key", R::SHAPE))
            })?;
            aggregate.accumulate(key, record.measure());
        }
        Ok(aggregate)
    }

    /// Gives read access to the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// True while the last `load` failed and writes are refused.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn ensure_writable(&self, operation: &str) -> StoreResult<()> {
        if !self.degraded {
            return Ok(());
        }
        Err(persist_failure::<R>(
            operation,
            StorageError::InvalidData(format!(
                "{} storage was not loaded; writes are disabled until a load succeeds",
                R::SHAPE
            )),
        ))
    }

    fn position(&self, handle: Handle) -> StoreResult<usize> {
        self.entries
            .iter()
            .position(|entry| entry.handle == handle)
            .ok_or(StoreError::NotFound(handle))
    }
}

fn persist_failure<R: Record>(operation: &str, err: StorageError) -> StoreError {
    error!(
        "event=store_{operation} module=store status=error shape={} error_code=persist_failed error={}",
        R::SHAPE,
        err
    );
    StoreError::PersistFailure(err)
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError};
    use crate::model::contact::Contact;
    use crate::storage::{MemoryStorage, StoragePort};

    fn ann() -> Contact {
        Contact::new("Ann", "12345", "a@b.co", "X")
    }

    #[test]
    fn load_of_empty_port_yields_empty_collection() {
        let mut store = RecordStore::new(MemoryStorage::<Contact>::new());
        assert!(store.load().unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_persisted_row_makes_store_read_only() {
        let mut port = MemoryStorage::<Contact>::new();
        port.insert(&Contact::new("Old", "not-digits", "old@x.io", "A"))
            .unwrap();

        let mut store = RecordStore::new(port);
        assert!(matches!(store.load(), Err(StoreError::StorageUnavailable(_))));
        assert!(store.is_degraded());

        let err = store.add(ann()).unwrap_err();
        assert!(matches!(err, StoreError::PersistFailure(_)));
        assert!(store.is_empty());
        assert_eq!(store.port().len(), 1);
    }

    #[test]
    fn aggregate_rejects_unknown_field() {
        let mut store = RecordStore::new(MemoryStorage::<Contact>::new());
        store.add(ann()).unwrap();
        let err = store.aggregate("nickname", |_| true).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(message) if message.contains("nickname")));
    }

    #[test]
    fn aggregate_on_contacts_counts_per_group() {
        let mut store = RecordStore::new(MemoryStorage::<Contact>::new());
        store.add(ann()).unwrap();
        store.add(Contact::new("Ann", "999", "ann@work.io", "Y")).unwrap();
        store.add(Contact::new("Bob", "1", "b@b.co", "")).unwrap();

        let by_name = store.aggregate("name", |_| true).unwrap();
        assert_eq!(by_name.get("Ann"), Some(2.0));
        assert_eq!(by_name.get("Bob"), Some(1.0));
    }
}

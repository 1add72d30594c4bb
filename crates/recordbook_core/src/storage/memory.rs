//! Volatile storage port.
//!
//! Used by tests and by callers that want a scratch store with the same
//! handle semantics as the durable ports.

use crate::model::record::{Entry, Handle};
use crate::storage::{StorageError, StoragePort, StorageResult};

/// In-memory port; contents are lost on drop.
#[derive(Debug, Clone)]
pub struct MemoryStorage<R> {
    rows: Vec<Entry<R>>,
    next_handle: u64,
}

impl<R> MemoryStorage<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_handle: 1,
        }
    }

    /// Number of persisted rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, handle: Handle) -> StorageResult<usize> {
        self.rows
            .iter()
            .position(|entry| entry.handle == handle)
            .ok_or(StorageError::MissingRow(handle))
    }
}

impl<R> Default for MemoryStorage<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone> StoragePort<R> for MemoryStorage<R> {
    fn read_all(&mut self) -> StorageResult<Vec<Entry<R>>> {
        Ok(self.rows.clone())
    }

    fn insert(&mut self, record: &R) -> StorageResult<Handle> {
        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        self.rows.push(Entry::new(handle, record.clone()));
        Ok(handle)
    }

    fn update(&mut self, handle: Handle, record: &R) -> StorageResult<()> {
        let index = self.position(handle)?;
        self.rows[index].record = record.clone();
        Ok(())
    }

    fn delete(&mut self, handle: Handle) -> StorageResult<()> {
        let index = self.position(handle)?;
        self.rows.remove(index);
        Ok(())
    }
}

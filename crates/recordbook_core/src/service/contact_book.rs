//! Contact book use-case service.
//!
//! # Responsibility
//! - Provide add/view/edit/delete entry points for the contact form.
//! - Produce display rows that carry their handle alongside the row number.
//! - Translate store errors into the messages the form shows.
//!
//! # Invariants
//! - Row numbers are for display only; every action takes a `Handle`.
//! - The service never bypasses `RecordStore` validation or write-through.

use crate::model::contact::Contact;
use crate::model::record::Handle;
use crate::storage::{FlatFileStorage, StoragePort};
use crate::store::{RecordStore, StoreError, StoreResult};
use log::info;
use std::path::PathBuf;

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    /// Identity used for view/edit/delete.
    pub handle: Handle,
    /// 1-based position in the current listing.
    pub row_number: usize,
    pub contact: Contact,
}

/// Contact book over a storage port, flat file by default.
pub struct ContactBook<P: StoragePort<Contact> = FlatFileStorage> {
    store: RecordStore<Contact, P>,
}

impl ContactBook<FlatFileStorage> {
    /// Opens the contacts file at `path`.
    ///
    /// A missing file yields an empty book. An unreadable file is logged and
    /// also yields an empty book whose writes fail until the file is fixed.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let book = Self::with_port(FlatFileStorage::new(path));
        info!(
            "event=contact_book_open module=service status=ok contacts={}",
            book.len()
        );
        book
    }
}

impl<P: StoragePort<Contact>> ContactBook<P> {
    /// Loads the book from `port`, starting empty if the port cannot be read.
    pub fn with_port(port: P) -> Self {
        Self {
            store: RecordStore::open(port),
        }
    }

    pub fn add(&mut self, contact: Contact) -> StoreResult<Handle> {
        self.store.add(contact)
    }

    pub fn view(&self, handle: Handle) -> StoreResult<&Contact> {
        self.store.get(handle)
    }

    /// Replaces the selected contact with `contact`.
    pub fn edit(&mut self, handle: Handle, contact: Contact) -> StoreResult<()> {
        self.store.update(handle, contact)
    }

    pub fn delete(&mut self, handle: Handle) -> StoreResult<Contact> {
        self.store.remove(handle)
    }

    /// Rows in insertion order, numbered from 1.
    pub fn contacts(&self) -> Vec<ContactRow> {
        self.store
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| ContactRow {
                handle: entry.handle,
                row_number: index + 1,
                contact: entry.record.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// True when the backing storage could not be loaded; edits are refused.
    pub fn is_read_only(&self) -> bool {
        self.store.is_degraded()
    }
}

/// Message shown to the user when `action` (add/view/edit/delete) fails.
pub fn contact_error_message(err: &StoreError, action: &str) -> String {
    match err {
        StoreError::Validation(validation) => match validation.field {
            "phone" => "Phone number should be an integer.".to_string(),
            "email" => "Email ID is not in correct format.".to_string(),
            field => format!("The {field} field must not contain `|`."),
        },
        StoreError::NotFound(_) => format!("Please select a contact to {action}."),
        StoreError::StorageUnavailable(_) | StoreError::PersistFailure(_) => {
            format!("Could not save contacts: {err}")
        }
        StoreError::InvalidArgument(_) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{contact_error_message, ContactBook};
    use crate::model::contact::Contact;
    use crate::model::record::{Handle, ValidationError, ValidationReason};
    use crate::storage::MemoryStorage;
    use crate::store::StoreError;

    #[test]
    fn rows_carry_handles_not_positions() {
        let mut book = ContactBook::with_port(MemoryStorage::<Contact>::new());
        let first = book.add(Contact::new("Ann", "1", "a@b.co", "")).unwrap();
        let second = book.add(Contact::new("Bob", "2", "b@b.co", "")).unwrap();
        book.delete(first).unwrap();

        let rows = book.contacts();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].handle, second);
        assert_eq!(book.view(rows[0].handle).unwrap().name, "Bob");
    }

    #[test]
    fn error_messages_match_form_wording() {
        let phone = StoreError::Validation(ValidationError::new(
            "phone",
            ValidationReason::NotDigits,
        ));
        assert_eq!(
            contact_error_message(&phone, "add"),
            "Phone number should be an integer."
        );
        let missing = StoreError::NotFound(Handle::new(3));
        assert_eq!(
            contact_error_message(&missing, "edit"),
            "Please select a contact to edit."
        );
    }
}

use chrono::NaiveDate;
use recordbook_core::{
    Contact, Entry, Handle, MemoryStorage, RecordStore, StorageError, StoragePort, StorageResult,
    StoreError, Transaction, TransactionKind,
};
use std::cell::Cell;
use std::rc::Rc;

/// Memory port whose writes can be switched to fail from the outside.
struct FlakyStorage<R> {
    inner: MemoryStorage<R>,
    fail_writes: Rc<Cell<bool>>,
}

impl<R> FlakyStorage<R> {
    fn new() -> (Self, Rc<Cell<bool>>) {
        let flag = Rc::new(Cell::new(false));
        let port = Self {
            inner: MemoryStorage::new(),
            fail_writes: Rc::clone(&flag),
        };
        (port, flag)
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl<R: Clone> StoragePort<R> for FlakyStorage<R> {
    fn read_all(&mut self) -> StorageResult<Vec<Entry<R>>> {
        self.inner.read_all()
    }

    fn insert(&mut self, record: &R) -> StorageResult<Handle> {
        self.check()?;
        self.inner.insert(record)
    }

    fn update(&mut self, handle: Handle, record: &R) -> StorageResult<()> {
        self.check()?;
        self.inner.update(handle, record)
    }

    fn delete(&mut self, handle: Handle) -> StorageResult<()> {
        self.check()?;
        self.inner.delete(handle)
    }
}

/// Port that cannot be read at all.
struct OfflineStorage;

impl StoragePort<Contact> for OfflineStorage {
    fn read_all(&mut self) -> StorageResult<Vec<Entry<Contact>>> {
        Err(StorageError::Io(std::io::Error::other("offline")))
    }

    fn insert(&mut self, _record: &Contact) -> StorageResult<Handle> {
        Err(StorageError::Io(std::io::Error::other("offline")))
    }

    fn update(&mut self, _handle: Handle, _record: &Contact) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("offline")))
    }

    fn delete(&mut self, _handle: Handle) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("offline")))
    }
}

fn ann() -> Contact {
    Contact::new("Ann", "12345", "a@b.co", "X")
}

fn contact_store() -> RecordStore<Contact, MemoryStorage<Contact>> {
    RecordStore::new(MemoryStorage::new())
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[test]
fn add_then_get_returns_supplied_fields() {
    let mut store = contact_store();
    let handle = store.add(ann()).unwrap();
    assert_eq!(store.get(handle).unwrap(), &ann());
}

#[test]
fn removed_handle_is_not_found_everywhere() {
    let mut store = contact_store();
    let handle = store.add(ann()).unwrap();
    let removed = store.remove(handle).unwrap();
    assert_eq!(removed, ann());

    assert!(matches!(store.get(handle), Err(StoreError::NotFound(h)) if h == handle));
    assert!(matches!(
        store.update(handle, ann()),
        Err(StoreError::NotFound(h)) if h == handle
    ));
    assert!(matches!(store.remove(handle), Err(StoreError::NotFound(h)) if h == handle));
}

#[test]
fn invalid_update_leaves_record_unchanged() {
    let mut store = contact_store();
    let handle = store.add(ann()).unwrap();

    let mut bad = ann();
    bad.email = "a@@b.co".to_string();
    let err = store.update(handle, bad).unwrap_err();
    assert!(matches!(err, StoreError::Validation(ref v) if v.field == "email"));
    assert_eq!(store.get(handle).unwrap(), &ann());
}

#[test]
fn invalid_add_does_not_mutate() {
    let mut store = contact_store();
    let mut bad = ann();
    bad.phone = "123-45".to_string();
    let err = store.add(bad).unwrap_err();
    assert!(matches!(err, StoreError::Validation(ref v) if v.field == "phone"));
    assert!(store.is_empty());
    assert!(store.port().is_empty());
}

#[test]
fn removing_missing_handle_keeps_collection() {
    let mut store = contact_store();
    store.add(ann()).unwrap();
    let before = store.list();

    let err = store.remove(Handle::new(999)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(store.list(), before);
}

#[test]
fn list_preserves_insertion_order_and_allows_duplicates() {
    let mut store = contact_store();
    let first = store.add(ann()).unwrap();
    let second = store.add(ann()).unwrap();
    let third = store.add(Contact::new("Zed", "9", "z@z.io", "")).unwrap();

    let handles: Vec<Handle> = store.list().iter().map(|entry| entry.handle).collect();
    assert_eq!(handles, vec![first, second, third]);

    store.update(first, Contact::new("Amy", "1", "amy@x.io", "")).unwrap();
    let names: Vec<String> = store
        .list()
        .into_iter()
        .map(|entry| entry.record.name)
        .collect();
    assert_eq!(names, vec!["Amy", "Ann", "Zed"]);
}

#[test]
fn persist_failure_rolls_back_every_mutation() {
    let (port, fail_writes) = FlakyStorage::new();
    let mut store = RecordStore::new(port);
    let handle = store.add(ann()).unwrap();

    fail_writes.set(true);

    let err = store.add(Contact::new("Bob", "1", "b@b.co", "")).unwrap_err();
    assert!(matches!(err, StoreError::PersistFailure(_)));
    assert_eq!(store.len(), 1);

    let err = store
        .update(handle, Contact::new("Bob", "1", "b@b.co", ""))
        .unwrap_err();
    assert!(matches!(err, StoreError::PersistFailure(_)));
    assert_eq!(store.get(handle).unwrap(), &ann());

    let err = store.remove(handle).unwrap_err();
    assert!(matches!(err, StoreError::PersistFailure(_)));
    assert!(store.contains(handle));

    fail_writes.set(false);
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, vec![Entry::new(handle, ann())]);
}

#[test]
fn unreachable_port_loads_empty_with_storage_unavailable() {
    let mut store: RecordStore<Contact, OfflineStorage> = RecordStore::new(OfflineStorage);
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::StorageUnavailable(_)));
    assert!(store.is_empty());

    let opened: RecordStore<Contact, OfflineStorage> = RecordStore::open(OfflineStorage);
    assert!(opened.is_empty());
}

#[test]
fn aggregate_sums_expenses_by_description() {
    let mut store = RecordStore::new(MemoryStorage::new());
    store
        .add(Transaction::new(TransactionKind::Expense, 10.0, day(1), "Food"))
        .unwrap();
    store
        .add(Transaction::new(TransactionKind::Expense, 5.0, day(2), "Food"))
        .unwrap();
    store
        .add(Transaction::new(TransactionKind::Income, 100.0, day(3), "Salary"))
        .unwrap();

    let by_description = store
        .aggregate("description", |tx: &Transaction| tx.kind == TransactionKind::Expense)
        .unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description.get("Food"), Some(15.0));
    assert_eq!(by_description.get("Salary"), None);
}

#[test]
fn aggregate_groups_follow_first_occurrence() {
    let mut store = RecordStore::new(MemoryStorage::new());
    for (kind, amount) in [
        (TransactionKind::Expense, 3.0),
        (TransactionKind::Income, 7.0),
        (TransactionKind::Expense, 4.0),
    ] {
        store
            .add(Transaction::new(kind, amount, day(4), "x"))
            .unwrap();
    }

    let totals = store.aggregate("kind", |_| true).unwrap();
    assert_eq!(
        totals.iter().collect::<Vec<_>>(),
        vec![("Expense", 7.0), ("Income", 7.0)]
    );
}

#[test]
fn aggregate_of_empty_store_is_empty() {
    let store: RecordStore<Transaction, MemoryStorage<Transaction>> =
        RecordStore::new(MemoryStorage::new());
    let totals = store.aggregate("description", |_| true).unwrap();
    assert!(totals.is_empty());
}

#[test]
fn non_finite_amount_is_rejected() {
    let mut store = RecordStore::new(MemoryStorage::new());
    let err = store
        .add(Transaction::new(TransactionKind::Income, f64::NAN, day(5), "x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(ref v) if v.field == "amount"));
}

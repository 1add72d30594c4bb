//! Personal-finance use-case service.
//!
//! # Responsibility
//! - Turn transaction form input into validated ledger writes.
//! - Derive the dashboard: income vs expense, expenses per category, balance.
//! - Hold the user-set opening balance.
//!
//! # Invariants
//! - The balance is recomputed from the ledger on every read, never cached.
//! - The income/expense chart is never empty; with no totals it carries a
//!   single placeholder slice.

use crate::model::record::{Entry, Handle, ValidationReason};
use crate::model::transaction::{
    balance, parse_amount, Transaction, TransactionForm, TransactionKind,
};
use crate::storage::{SqliteTransactionStorage, StoragePort};
use crate::store::{Aggregate, RecordStore, StoreError, StoreResult};
use log::info;
use std::path::Path;

/// Label of the placeholder slice shown when there is nothing to chart.
pub const NO_DATA_LABEL: &str = "No data available";

/// One labelled value of a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
}

impl ChartSlice {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Everything the dashboard tab renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// `[Income, Expense]`, or one `NO_DATA_LABEL` slice when both are zero.
    pub income_vs_expense: Vec<ChartSlice>,
    /// Expense totals per description, `Uncategorized` for empty ones.
    pub expense_by_category: Aggregate,
    pub balance: f64,
}

impl Dashboard {
    pub fn has_data(&self) -> bool {
        !(self.income_vs_expense.len() == 1 && self.income_vs_expense[0].label == NO_DATA_LABEL)
    }
}

/// Finance tracker over a ledger port, SQLite by default.
pub struct FinanceTracker<P: StoragePort<Transaction> = SqliteTransactionStorage> {
    store: RecordStore<Transaction, P>,
    initial_balance: f64,
}

impl FinanceTracker<SqliteTransactionStorage> {
    /// Opens (creating if needed) the ledger database at `path`.
    ///
    /// # Errors
    /// - `StorageUnavailable` when the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>, initial_balance: f64) -> StoreResult<Self> {
        let port =
            SqliteTransactionStorage::open(path).map_err(StoreError::StorageUnavailable)?;
        let tracker = Self::with_port(port, initial_balance);
        info!(
            "event=finance_open module=service status=ok transactions={}",
            tracker.store.len()
        );
        Ok(tracker)
    }

    pub fn open_in_memory(initial_balance: f64) -> StoreResult<Self> {
        let port =
            SqliteTransactionStorage::open_in_memory().map_err(StoreError::StorageUnavailable)?;
        Ok(Self::with_port(port, initial_balance))
    }
}

impl<P: StoragePort<Transaction>> FinanceTracker<P> {
    /// Loads the ledger from `port`, starting empty if the port cannot be read.
    pub fn with_port(port: P, initial_balance: f64) -> Self {
        Self {
            store: RecordStore::open(port),
            initial_balance,
        }
    }

    pub fn add(&mut self, form: &TransactionForm) -> StoreResult<Handle> {
        let transaction = Transaction::try_from(form)?;
        self.store.add(transaction)
    }

    /// Replaces the selected transaction with the form contents.
    pub fn edit(&mut self, handle: Handle, form: &TransactionForm) -> StoreResult<()> {
        if !self.store.contains(handle) {
            return Err(StoreError::NotFound(handle));
        }
        let transaction = Transaction::try_from(form)?;
        self.store.update(handle, transaction)
    }

    pub fn delete(&mut self, handle: Handle) -> StoreResult<Transaction> {
        self.store.remove(handle)
    }

    pub fn get(&self, handle: Handle) -> StoreResult<&Transaction> {
        self.store.get(handle)
    }

    /// Ledger rows in insertion order, each with its handle.
    pub fn transactions(&self) -> Vec<Entry<Transaction>> {
        self.store.list()
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Parses and stores a new opening balance typed by the user.
    pub fn set_initial_balance(&mut self, input: &str) -> StoreResult<f64> {
        let value = parse_amount("balance", input)?;
        self.initial_balance = value;
        info!("event=finance_set_balance module=service status=ok");
        Ok(value)
    }

    /// Opening balance minus every recorded expense.
    pub fn balance(&self) -> f64 {
        balance(self.initial_balance, self.store.records())
    }

    pub fn dashboard(&self) -> StoreResult<Dashboard> {
        let totals = self.store.aggregate("kind", |_| true)?;
        let income = totals.get(TransactionKind::Income.as_str()).unwrap_or(0.0);
        let expense = totals.get(TransactionKind::Expense.as_str()).unwrap_or(0.0);

        let income_vs_expense = if income == 0.0 && expense == 0.0 {
            vec![ChartSlice::new(NO_DATA_LABEL, 1.0)]
        } else {
            vec![
                ChartSlice::new(TransactionKind::Income.as_str(), income),
                ChartSlice::new(TransactionKind::Expense.as_str(), expense),
            ]
        };

        Ok(Dashboard {
            income_vs_expense,
            expense_by_category: self
                .store
                .aggregate("description", Transaction::is_expense)?,
            balance: self.balance(),
        })
    }

    /// True when the backing storage could not be loaded; edits are refused.
    pub fn is_read_only(&self) -> bool {
        self.store.is_degraded()
    }
}

/// Message shown to the user when `action` (add/edit/delete) fails.
pub fn finance_error_message(err: &StoreError, action: &str) -> String {
    match err {
        StoreError::Validation(validation) => match (validation.field, &validation.reason) {
            ("amount", ValidationReason::Empty) => "Amount cannot be empty.".to_string(),
            ("amount", _) => "Please enter a valid amount.".to_string(),
            ("balance", _) => "Please enter a valid bank balance.".to_string(),
            ("kind", _) => "Please choose Income or Expense.".to_string(),
            _ => validation.to_string(),
        },
        StoreError::NotFound(_) => format!("Please select a transaction to {action}."),
        StoreError::StorageUnavailable(_) | StoreError::PersistFailure(_) => {
            format!("Could not save transaction: {err}")
        }
        StoreError::InvalidArgument(_) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{finance_error_message, FinanceTracker, NO_DATA_LABEL};
    use crate::model::record::{ValidationError, ValidationReason};
    use crate::model::transaction::Transaction;
    use crate::storage::MemoryStorage;
    use crate::store::StoreError;

    #[test]
    fn empty_ledger_dashboard_uses_placeholder() {
        let tracker = FinanceTracker::with_port(MemoryStorage::<Transaction>::new(), 100.0);
        let dashboard = tracker.dashboard().unwrap();
        assert!(!dashboard.has_data());
        assert_eq!(dashboard.income_vs_expense[0].label, NO_DATA_LABEL);
        assert!(dashboard.expense_by_category.is_empty());
        assert_eq!(dashboard.balance, 100.0);
    }

    #[test]
    fn set_initial_balance_rejects_text() {
        let mut tracker = FinanceTracker::with_port(MemoryStorage::<Transaction>::new(), 100.0);
        let err = tracker.set_initial_balance("lots").unwrap_err();
        assert!(matches!(&err, StoreError::Validation(v) if v.field == "balance"));
        assert_eq!(tracker.initial_balance(), 100.0);
        assert_eq!(tracker.set_initial_balance("250.5").unwrap(), 250.5);
    }

    #[test]
    fn empty_amount_has_dedicated_message() {
        let err = StoreError::Validation(ValidationError::new("amount", ValidationReason::Empty));
        assert_eq!(finance_error_message(&err, "edit"), "Amount cannot be empty.");
    }
}

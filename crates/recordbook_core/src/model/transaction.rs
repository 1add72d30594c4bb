//! Personal-finance transaction shape and form parsing.
//!
//! # Responsibility
//! - Define the ledger record and its kind enum.
//! - Turn raw form input into a validated `Transaction`.
//!
//! # Invariants
//! - `amount` is always finite.
//! - `kind` only ever holds `Income` or `Expense`.
//! - Dates are exchanged with storage as `dd-mm-YYYY`.

use crate::model::record::{Record, ValidationError, ValidationReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Date format shared with the persisted `transactions.date` column.
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Group label for expenses with an empty description.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Income" => Ok(Self::Income),
            "Expense" => Ok(Self::Expense),
            other => Err(ValidationError::new(
                "kind",
                ValidationReason::UnknownKind(other.to_string()),
            )),
        }
    }
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Serialized as `type` to match the storage column name.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Unsigned magnitude; the sign is implied by `kind`.
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            date,
            description: description.into(),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}

impl Record for Transaction {
    const SHAPE: &'static str = "transaction";
    const FIELDS: &'static [&'static str] = &["kind", "amount", "date", "description"];

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() {
            return Err(ValidationError::new("amount", ValidationReason::NotFinite));
        }
        Ok(())
    }

    fn group_key(&self, field: &str) -> Option<String> {
        match field {
            "kind" => Some(self.kind.to_string()),
            "amount" => Some(self.amount.to_string()),
            "date" => Some(self.date.format(DATE_FORMAT).to_string()),
            "description" if self.description.is_empty() => Some(UNCATEGORIZED.to_string()),
            "description" => Some(self.description.clone()),
            _ => None,
        }
    }

    fn measure(&self) -> f64 {
        self.amount
    }
}

/// Raw transaction form input as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionForm {
    pub kind: String,
    pub amount: String,
    pub date: NaiveDate,
    pub description: String,
}

impl TryFrom<&TransactionForm> for Transaction {
    type Error = ValidationError;

    fn try_from(form: &TransactionForm) -> Result<Self, Self::Error> {
        let kind = form.kind.parse::<TransactionKind>()?;
        let amount = parse_amount("amount", &form.amount)?;
        Ok(Self::new(kind, amount, form.date, form.description.clone()))
    }
}

/// Parses a finite decimal number typed into `field`.
///
/// Surrounding whitespace is ignored; `inf` and `NaN` are rejected.
pub fn parse_amount(field: &'static str, input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationReason::Empty));
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::new(field, ValidationReason::NotANumber))?;
    if !value.is_finite() {
        return Err(ValidationError::new(field, ValidationReason::NotFinite));
    }
    Ok(value)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Running balance derived from the ledger.
///
/// Expenses reduce `initial`; income leaves it untouched.
pub fn balance<'a>(initial: f64, transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    transactions
        .into_iter()
        .filter(|transaction| transaction.is_expense())
        .fold(initial, |acc, transaction| acc - transaction.amount)
}

//! Shape-agnostic record contracts.
//!
//! # Responsibility
//! - Define the stable `Handle` used for selection, edit and delete.
//! - Define the `Record` trait every persisted shape implements.
//! - Carry field-level validation failures back to the caller.
//!
//! # Invariants
//! - A `Handle` is never derived from display position.
//! - `Record::FIELDS` lists every name accepted by `Record::group_key`.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable, opaque identifier for one record in a store.
///
/// Handles are assigned by the storage port on insert and stay attached to the
/// record until it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Wraps a raw identifier produced by a storage port.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier, e.g. for SQL binding.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

/// One `(handle, record)` pair of an ordered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<R> {
    pub handle: Handle,
    pub record: R,
}

impl<R> Entry<R> {
    pub fn new(handle: Handle, record: R) -> Self {
        Self { handle, record }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// Required input was empty.
    Empty,
    /// Input must consist of ASCII decimal digits only.
    NotDigits,
    /// Input does not look like `local@domain.tld`.
    MalformedEmail,
    /// Input is not a decimal number.
    NotANumber,
    /// Input parsed to infinity or NaN.
    NotFinite,
    /// Transaction kind outside `Income | Expense`.
    UnknownKind(String),
    /// Input contains the flat-file field delimiter.
    ContainsDelimiter(char),
}

impl Display for ValidationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "value cannot be empty"),
            Self::NotDigits => write!(f, "value must contain digits only"),
            Self::MalformedEmail => write!(f, "value is not in correct email format"),
            Self::NotANumber => write!(f, "value is not a valid number"),
            Self::NotFinite => write!(f, "value must be a finite number"),
            Self::UnknownKind(value) => {
                write!(f, "unknown kind `{value}`; expected Income|Expense")
            }
            Self::ContainsDelimiter(ch) => write!(f, "value must not contain `{ch}`"),
        }
    }
}

/// User-correctable input defect on one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.reason)
    }
}

impl Error for ValidationError {}

/// Contract for a record shape held by a `RecordStore`.
pub trait Record: Clone {
    /// Short shape name used in log events.
    const SHAPE: &'static str;
    /// Field names in declaration order.
    const FIELDS: &'static [&'static str];

    /// Checks the shape's field rules.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Group label of this record for `field`, or `None` for unknown fields.
    fn group_key(&self, field: &str) -> Option<String>;

    /// Numeric contribution of this record to an aggregate group.
    fn measure(&self) -> f64;
}

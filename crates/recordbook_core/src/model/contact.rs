//! Contact book record shape.
//!
//! # Invariants
//! - `phone` is non-empty and ASCII digits only.
//! - `email` matches `local@domain.tld` with a TLD of two or more letters.
//! - No field contains the `|` flat-file delimiter.

use crate::model::record::{Record, ValidationError, ValidationReason};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Field delimiter of the contacts flat file.
pub const FIELD_DELIMITER: char = '|';

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// One contact book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Free text, may span several lines.
    pub address: String,
}

impl Contact {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
        }
    }
}

impl Record for Contact {
    const SHAPE: &'static str = "contact";
    const FIELDS: &'static [&'static str] = &["name", "phone", "email", "address"];

    fn validate(&self) -> Result<(), ValidationError> {
        validate_phone(&self.phone)?;
        validate_email(&self.email)?;
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("address", &self.address),
        ] {
            if value.contains(FIELD_DELIMITER) {
                return Err(ValidationError::new(
                    field,
                    ValidationReason::ContainsDelimiter(FIELD_DELIMITER),
                ));
            }
        }
        Ok(())
    }

    fn group_key(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "phone" => Some(self.phone.clone()),
            "email" => Some(self.email.clone()),
            "address" => Some(self.address.clone()),
            _ => None,
        }
    }

    fn measure(&self) -> f64 {
        1.0
    }
}

/// Accepts non-empty ASCII digit strings of any length.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::new("phone", ValidationReason::Empty));
    }
    if !phone.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new("phone", ValidationReason::NotDigits));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "email",
            ValidationReason::MalformedEmail,
        ))
    }
}

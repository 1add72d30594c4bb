//! Record shapes held by the record store.
//!
//! # Responsibility
//! - Define the contact and transaction shapes and their field rules.
//! - Define the shape-agnostic `Record` contract and stable `Handle`.
//!
//! # Invariants
//! - Validation is pure; it never touches storage.

pub mod contact;
pub mod record;
pub mod transaction;

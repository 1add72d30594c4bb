//! Use-case services for the two form applications.
//!
//! # Responsibility
//! - Wrap a `RecordStore` per application behind form-level entry points.
//! - Keep presentation callers decoupled from storage details.

pub mod contact_book;
pub mod finance;

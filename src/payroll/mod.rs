//! Payroll records: CSV input, field derivation and amount spelling.

pub mod derivation;
pub mod input;
pub mod record;
pub mod words;

pub use derivation::{derive, derive_now, previous_month_label, DerivationError, DerivedFields};
pub use input::{parse_records, InputError};
pub use record::{fields, keys_match, FieldValue, Record};

//! Validation rules that run before any CRM dispatch.
//!
//! Two concerns: per-subfield required checks on composite form fields
//! (block the submission with user-facing errors), and required-field
//! mapping checks when form settings are saved.

pub mod mapping;
pub mod subfield;

pub use mapping::validate_mapping;
pub use subfield::{is_blank, validate_subfields, CompositeValue, SubfieldError, SubfieldSpec};

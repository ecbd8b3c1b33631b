//! FormSync core: shared CRM sync types and errors.
//!
//! Everything a provider adapter and the dispatch engine have in common
//! lives here: normalized field descriptors, object payloads, stored
//! mappings, connection settings, and the error taxonomy.

pub mod error;
pub mod field;
pub mod mapping;
pub mod object;
pub mod settings;
pub mod submission;

pub use error::{Error, Result};
pub use field::{FieldDescriptor, FieldOption, FieldOptions, FieldType};
pub use mapping::{FieldMapping, MappingEntry, ObjectSync, SyncSettings};
pub use object::{DispatchResult, ObjectPayload, ObjectType, SyncOutcome};
pub use settings::{ConnectionConfig, Credentials};
pub use submission::Submission;

//! Mapping validation run when form settings are saved.

use formsync_core::{FieldDescriptor, FieldMapping};

/// Check that every required descriptor has a non-empty source in the
/// mapping. Returns one message per unmapped required field, in
/// descriptor order. Run only for object types that are both enabled
/// and mapped (the host skips disabled ones).
pub fn validate_mapping(descriptors: &[FieldDescriptor], mapping: &FieldMapping) -> Vec<String> {
    let mut errors = Vec::new();

    for descriptor in descriptors {
        if !descriptor.required {
            continue;
        }

        let mapped = mapping
            .source_for(&descriptor.handle)
            .is_some_and(|source| !source.trim().is_empty());

        if !mapped {
            errors.push(format!("\"{}\" must be mapped.", descriptor.name));
        }
    }

    errors
}

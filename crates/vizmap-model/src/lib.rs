//! Data model shared by the field tracking, tokenization and remapping engine.
//!
//! Types in this crate are plain values: the engine never mutates a caller's
//! registry in place, every operation returns a new one.

pub mod error;
pub mod field;
pub mod ids;
pub mod tracked;
pub mod usermeta;

pub use error::{ModelError, Result};
pub use field::{DataType, DatasetField, FieldRole};
pub use ids::Placeholder;
pub use tracked::{TrackedDrilldown, TrackedFieldEntry, TrackedFields, UsageKind};
pub use usermeta::{TemplateInformation, TemplateUsermeta, UsermetaDatasetField};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_fields_reject_unreferenced_entries() {
        let mut fields = TrackedFields::new();
        let entry = TrackedFieldEntry::new("sales", "Sales");
        assert!(!fields.insert(entry));
        assert!(fields.is_empty());
    }

    #[test]
    fn dataset_field_serializes_camel_case() {
        let field = DatasetField::measure("Sum(Sales)", "Sales", DataType::Numeric);
        let json = serde_json::to_string(&field).expect("serialize field");
        assert!(json.contains("\"dataType\":\"numeric\""));
        assert!(json.contains("\"isHighlightComponent\":false"));
    }
}

//! Template usermeta built from a tracked registry.

use vizmap_model::{
    DataType, DatasetField, FieldRole, TemplateInformation, TemplateUsermeta, TrackedFields,
    UsermetaDatasetField,
};

use crate::tokenizer::{TokenizationRequest, tokenize};
use crate::tracker::{TrackingRequest, track};

/// A portable template: tokenized text plus its slot metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExport {
    pub spec_text: String,
    pub usermeta: TemplateUsermeta,
    pub tracked_fields: TrackedFields,
}

/// One slot per tokenizable tracked field, ordered by placeholder.
pub fn build_usermeta_dataset(
    tracked: &TrackedFields,
    known_fields: &[DatasetField],
) -> Vec<UsermetaDatasetField> {
    tracked
        .by_placeholder()
        .into_iter()
        .filter_map(|entry| {
            let token = entry.placeholder.as_ref()?;
            let (data_type, kind) = known_fields
                .iter()
                .find(|field| field.key == entry.field_key)
                .map_or((DataType::Text, FieldRole::Column), |field| {
                    (field.data_type, field.role)
                });
            Some(UsermetaDatasetField::new(
                token.as_str(),
                &entry.name,
                data_type,
                kind,
            ))
        })
        .collect()
}

/// Tracks and tokenizes `spec_text` from scratch and describes its slots.
///
/// Synthetic names derived from a tracked field are tokenized too
/// (`Sales__highlight` becomes `__0____highlight`), so they follow the slot
/// when the template is applied.
pub fn export_template(
    spec_text: &str,
    known_fields: &[DatasetField],
    information: TemplateInformation,
) -> TemplateExport {
    let tracking = track(&TrackingRequest::new(spec_text, known_fields.to_vec()).with_reset(true));
    let tokenized = tokenize(
        &TokenizationRequest::new(spec_text, tracking.tracked_fields.clone()).for_remap(),
    );
    TemplateExport {
        spec_text: tokenized,
        usermeta: TemplateUsermeta {
            information,
            dataset: build_usermeta_dataset(&tracking.tracked_fields, known_fields),
        },
        tracked_fields: tracking.tracked_fields,
    }
}

/// Assigns every slot back to the tracked field that owns its placeholder.
///
/// Remapping with the result restores the text the registry was tracked from.
pub fn assign_from_tracked(slots: &mut [UsermetaDatasetField], tracked: &TrackedFields) {
    for slot in slots {
        if let Some(entry) = tracked.find_by_placeholder(&slot.key) {
            slot.assign(&entry.field_key, &entry.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::remapper::{RemappingRequest, remap};

    use super::*;

    #[test]
    fn export_lists_slots_in_placeholder_order() {
        let fields = vec![
            DatasetField::column("Table.Category", "Category", DataType::Text),
            DatasetField::measure("Sum(Table.Sales)", "Sales", DataType::Numeric),
        ];
        let export = export_template(
            r#"{"x":{"field":"Category"},"y":{"field":"Sales"}}"#,
            &fields,
            TemplateInformation::default(),
        );
        assert_eq!(export.spec_text, r#"{"x":{"field":"__0__"},"y":{"field":"__1__"}}"#);
        let keys: Vec<&str> = export.usermeta.dataset.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["__0__", "__1__"]);
        assert_eq!(export.usermeta.dataset[1].data_type, DataType::Numeric);
        assert_eq!(export.usermeta.dataset[1].kind, FieldRole::Measure);
        assert_eq!(export.usermeta.dataset[1].name, "Sales");
    }

    #[test]
    fn derived_names_follow_the_slot_on_apply() {
        let fields = vec![DatasetField::measure("Sum(Table.Sales)", "Sales", DataType::Numeric)];
        let spec = r#"{"y":{"field":"Sales"},"c":{"field":"Sales__highlight"}}"#;
        let export = export_template(spec, &fields, TemplateInformation::default());
        assert_eq!(
            export.spec_text,
            r#"{"y":{"field":"__0__"},"c":{"field":"__0____highlight"}}"#
        );

        let mut slots = export.usermeta.dataset.clone();
        slots[0].assign("Sum(Other.Revenue)", "Revenue");
        assert_eq!(
            remap(&RemappingRequest::new(&export.spec_text, slots)),
            r#"{"y":{"field":"Revenue"},"c":{"field":"Revenue__highlight"}}"#
        );

        let mut restore = export.usermeta.dataset.clone();
        assign_from_tracked(&mut restore, &export.tracked_fields);
        assert_eq!(remap(&RemappingRequest::new(&export.spec_text, restore)), spec);
    }
}

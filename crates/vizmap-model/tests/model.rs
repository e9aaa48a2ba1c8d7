use vizmap_model::{
    DataType, FieldRole, Placeholder, TemplateInformation, TemplateUsermeta, TrackedFieldEntry,
    TrackedFields, UsageKind, UsermetaDatasetField,
};

fn tracked(key: &str, name: &str, index: usize) -> TrackedFieldEntry {
    let mut entry = TrackedFieldEntry::new(key, name).with_placeholder(Placeholder::from_index(index));
    entry.record(UsageKind::Direct);
    entry
}

#[test]
fn tracked_fields_serialize_keyed_by_field() {
    let fields: TrackedFields = vec![tracked("Sum(Sales)", "Sales", 0)].into_iter().collect();
    let json = serde_json::to_value(&fields).unwrap();
    assert_eq!(json["Sum(Sales)"]["placeholder"], "__0__");
    assert_eq!(json["Sum(Sales)"]["matchCount"], 1);
    assert_eq!(json["Sum(Sales)"]["usages"]["direct"], 1);

    let back: TrackedFields = serde_json::from_value(json).unwrap();
    assert_eq!(back, fields);
}

#[test]
fn invalid_placeholder_fails_deserialization() {
    let json = r#"{"a":{"fieldKey":"a","name":"A","placeholder":"A","matchCount":1}}"#;
    assert!(serde_json::from_str::<TrackedFields>(json).is_err());
}

#[test]
fn template_usermeta_lists_unassigned_slots() {
    let mut usermeta = TemplateUsermeta {
        information: TemplateInformation {
            name: "Bar chart".to_string(),
            ..Default::default()
        },
        dataset: vec![
            UsermetaDatasetField::new("__0__", "Category", DataType::Text, FieldRole::Column),
            UsermetaDatasetField::new("__1__", "Sales", DataType::Numeric, FieldRole::Measure),
        ],
    };
    usermeta
        .field_mut("__0__")
        .expect("slot exists")
        .assign("Table.Region", "Region");

    let unassigned: Vec<&str> = usermeta.unassigned().map(|f| f.key.as_str()).collect();
    assert_eq!(unassigned, vec!["__1__"]);

    let json = serde_json::to_string(&usermeta).unwrap();
    let back: TemplateUsermeta = serde_json::from_str(&json).unwrap();
    assert_eq!(back.field("__0__").and_then(|f| f.supplied_object_name.as_deref()), Some("Region"));
}

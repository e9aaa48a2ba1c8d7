use proptest::prelude::*;
use vizmap_engine::{
    RemapCompleteness, RemappingRequest, TokenizationRequest, TrackingRequest,
    assign_from_tracked, build_usermeta_dataset, export_template, missing_tokens, remap,
    tokenize, track,
};
use vizmap_model::{
    DataType, DatasetField, FieldRole, Placeholder, TemplateInformation, TrackedDrilldown,
    UsageKind, UsermetaDatasetField,
};

fn sales() -> DatasetField {
    DatasetField::measure("Sum(Table.Sales)", "Sales", DataType::Numeric)
}

#[test]
fn export_and_restore_round_trip() {
    let spec = r#"{"encoding":{"y":{"field":"Sales"}}}"#;
    let export = export_template(spec, &[sales()], TemplateInformation::default());
    assert_eq!(export.spec_text, r#"{"encoding":{"y":{"field":"__0__"}}}"#);
    assert_eq!(export.usermeta.dataset.len(), 1);

    let mut slots = export.usermeta.dataset.clone();
    assign_from_tracked(&mut slots, &export.tracked_fields);
    let restored = remap(&RemappingRequest::new(&export.spec_text, slots));
    assert_eq!(restored, spec);
}

#[test]
fn missing_assignment_leaves_text_unchanged() {
    let tokenized = r#"{"encoding":{"y":{"field":"__0__"}}}"#;
    let slots = vec![UsermetaDatasetField::new(
        "__0__",
        "Sales",
        DataType::Numeric,
        FieldRole::Measure,
    )];
    let out = remap(&RemappingRequest::new(tokenized, slots.clone()));
    assert_eq!(out, tokenized);

    let status = RemapCompleteness::evaluate(&slots, &TrackedDrilldown::default());
    assert!(!status.remap_all_fields_assigned);
    assert!(!status.is_complete());
}

#[test]
fn field_names_never_match_inside_longer_names() {
    let fields = vec![
        DatasetField::measure("amount", "amount", DataType::Numeric),
        DatasetField::measure("total_amount", "total_amount", DataType::Numeric),
    ];
    let spec = r#"{"a":{"field":"total_amount"},"b":{"field":"amount"},"c":"datum.total_amount"}"#;
    let response = track(&TrackingRequest::new(spec, fields).with_reset(true));
    let tracked = &response.tracked_fields;
    assert_eq!(tracked.get("amount").map(|e| e.match_count), Some(1));
    assert_eq!(tracked.get("total_amount").map(|e| e.match_count), Some(2));

    let tokenized = tokenize(&TokenizationRequest::new(spec, tracked.clone()));
    assert_eq!(
        tokenized,
        r#"{"a":{"field":"__1__"},"b":{"field":"__0__"},"c":"datum.__1__"}"#
    );
}

#[test]
fn empty_input_yields_empty_results() {
    let response = track(&TrackingRequest::new("", vec![sales()]));
    assert!(response.tracked_fields.is_empty());
    assert!(!response.tracked_drilldown.is_current);

    let response = track(&TrackingRequest::new(r#"{"y":"Sales"}"#, Vec::new()));
    assert!(response.tracked_fields.is_empty());

    assert_eq!(tokenize(&TokenizationRequest::new("", response.tracked_fields)), "");
    assert_eq!(remap(&RemappingRequest::new("", Vec::new())), "");
}

#[test]
fn synthetic_highlight_names_follow_their_base_field() {
    let fields = vec![
        sales(),
        DatasetField::measure("Sales__highlight", "Sales__highlight", DataType::Numeric)
            .with_highlight_component(true),
    ];
    let spec = r#"{"y":{"field":"Sales"},"color":{"field":"Sales__highlight"},"opacity":{"field":"Sales__highlightStatus"}}"#;
    let response = track(&TrackingRequest::new(spec, fields.clone()).with_reset(true));
    let tracked = &response.tracked_fields;
    assert_eq!(tracked.len(), 1);
    let entry = tracked.get("Sum(Table.Sales)").unwrap();
    assert_eq!(entry.match_count, 3);
    assert_eq!(entry.count_for(UsageKind::Direct), 1);
    assert_eq!(entry.count_for(UsageKind::CrossHighlightValue), 1);
    assert_eq!(entry.count_for(UsageKind::CrossHighlightStatus), 1);
    assert_eq!(entry.usage_kind(), Some(UsageKind::Direct));

    let tokenized = tokenize(&TokenizationRequest::new(spec, tracked.clone()).for_remap());
    assert_eq!(
        tokenized,
        r#"{"y":{"field":"__0__"},"color":{"field":"__0____highlight"},"opacity":{"field":"__0____highlightStatus"}}"#
    );

    let mut slots = build_usermeta_dataset(tracked, &fields);
    slots[0].assign("Sum(Other.Revenue)", "Revenue");
    let remapped = remap(&RemappingRequest::new(tokenized, slots));
    assert_eq!(
        remapped,
        r#"{"y":{"field":"Revenue"},"color":{"field":"Revenue__highlight"},"opacity":{"field":"Revenue__highlightStatus"}}"#
    );
}

#[test]
fn merge_keeps_placeholders_of_fields_still_referenced() {
    let fields = vec![
        DatasetField::column("Table.Category", "Category", DataType::Text),
        sales(),
        DatasetField::measure("Sum(Table.Profit)", "Profit", DataType::Numeric),
    ];
    let first = track(
        &TrackingRequest::new(r#"{"x":"Category","y":"Sales"}"#, fields.clone()).with_reset(true),
    );
    assert_eq!(
        first
            .tracked_fields
            .get("Sum(Table.Sales)")
            .and_then(|e| e.placeholder.clone()),
        Some(Placeholder::from_index(1))
    );

    let second = track(
        &TrackingRequest::new(r#"{"y":"Sales","z":"Profit"}"#, fields)
            .with_previous(first.tracked_fields),
    );
    let tracked = &second.tracked_fields;
    assert!(!tracked.contains("Table.Category"));
    assert_eq!(
        tracked
            .get("Sum(Table.Sales)")
            .and_then(|e| e.placeholder.clone()),
        Some(Placeholder::from_index(1))
    );
    assert_eq!(
        tracked
            .get("Sum(Table.Profit)")
            .and_then(|e| e.placeholder.clone()),
        Some(Placeholder::from_index(0))
    );
}

#[test]
fn comments_and_formatting_survive_round_trip() {
    let spec = "{\n  // bar chart\n  \"mark\": \"bar\",\n  \"encoding\": {\n    \"y\": { \"field\": \"Umsatz €\" }\n  }\n}\n";
    let fields = vec![DatasetField::measure("Sum(t.Umsatz)", "Umsatz €", DataType::Numeric)];
    let export = export_template(spec, &fields, TemplateInformation::default());
    assert!(export.spec_text.contains("// bar chart"));
    assert!(missing_tokens(&export.spec_text, &export.tracked_fields).is_empty());

    let mut slots = export.usermeta.dataset.clone();
    assign_from_tracked(&mut slots, &export.tracked_fields);
    assert_eq!(remap(&RemappingRequest::new(&export.spec_text, slots)), spec);
}

#[test]
fn delimiter_like_names_keep_json_valid() {
    let fields = vec![
        DatasetField::column("t.a", "a", DataType::Text),
        DatasetField::column("t.comma", ",", DataType::Text),
    ];
    let spec = r#"{"x":["a","b"]}"#;
    let export = export_template(spec, &fields, TemplateInformation::default());
    assert_eq!(export.spec_text, r#"{"x":["__0__","b"]}"#);
    assert!(serde_json::from_str::<serde_json::Value>(&export.spec_text).is_ok());
    assert_eq!(export.usermeta.dataset.len(), 1);
}

#[test]
fn merged_placeholder_never_captures_existing_text() {
    let first = track(&TrackingRequest::new(r#"{"y":"Sales"}"#, vec![sales()]).with_reset(true));
    let spec = r#"{"title":"__0__","y":"Sales"}"#;
    let second = track(&TrackingRequest::new(spec, vec![sales()]).with_previous(first.tracked_fields));
    let tokenized = tokenize(&TokenizationRequest::new(spec, second.tracked_fields.clone()));
    assert_eq!(tokenized, r#"{"title":"__0__","y":"__1__"}"#);

    let mut slots = build_usermeta_dataset(&second.tracked_fields, &[sales()]);
    slots[0].assign("Sum(Other.Revenue)", "Revenue");
    assert_eq!(
        remap(&RemappingRequest::new(tokenized, slots)),
        r#"{"title":"__0__","y":"Revenue"}"#
    );
}

#[test]
fn remapped_accessors_are_tracked_again() {
    let spec = r#"{"t":{"expr":"datum.Sales * 2"},"y":{"field":"Sales"}}"#;
    let export = export_template(spec, &[sales()], TemplateInformation::default());
    assert_eq!(
        export.spec_text,
        r#"{"t":{"expr":"datum.__0__ * 2"},"y":{"field":"__0__"}}"#
    );

    let mut slots = export.usermeta.dataset.clone();
    slots[0].assign("Sum(Other.Total Sales)", "Total Sales");
    let remapped = remap(&RemappingRequest::new(&export.spec_text, slots));
    assert_eq!(
        remapped,
        r#"{"t":{"expr":"datum['Total Sales'] * 2"},"y":{"field":"Total Sales"}}"#
    );

    let total = DatasetField::measure("Sum(Other.Total Sales)", "Total Sales", DataType::Numeric);
    let response = track(&TrackingRequest::new(&remapped, vec![total]).with_reset(true));
    assert_eq!(
        response
            .tracked_fields
            .get("Sum(Other.Total Sales)")
            .map(|e| e.match_count),
        Some(2)
    );
}

fn spec_for(names: &[String]) -> String {
    let encodings: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| format!(r#""c{idx}":{{"field":"{name}"}}"#))
        .collect();
    let expr: Vec<String> = names.iter().map(|name| format!("datum.{name}")).collect();
    format!(
        r#"{{"encoding":{{{}}},"expr":"{}"}}"#,
        encodings.join(","),
        expr.join(" + ")
    )
}

proptest! {
    #[test]
    fn tokenization_is_idempotent(
        names in prop::collection::btree_set("[A-Za-z][A-Za-z0-9_]{0,8}", 1..6)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let fields: Vec<DatasetField> = names
            .iter()
            .map(|name| DatasetField::column(format!("t.{name}"), name.clone(), DataType::Text))
            .collect();
        let spec = spec_for(&names);
        let tracked = track(&TrackingRequest::new(&spec, fields).with_reset(true)).tracked_fields;
        let once = tokenize(&TokenizationRequest::new(&spec, tracked.clone()));
        let twice = tokenize(&TokenizationRequest::new(&once, tracked));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn remap_restores_tokenized_text(
        names in prop::collection::btree_set("[A-Za-z][A-Za-z0-9_]{0,8}", 1..6)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let fields: Vec<DatasetField> = names
            .iter()
            .map(|name| DatasetField::measure(format!("Sum({name})"), name.clone(), DataType::Numeric))
            .collect();
        let spec = spec_for(&names);
        let export = export_template(&spec, &fields, TemplateInformation::default());
        prop_assert_eq!(export.usermeta.dataset.len(), names.len());

        let mut slots = export.usermeta.dataset.clone();
        assign_from_tracked(&mut slots, &export.tracked_fields);
        let restored = remap(&RemappingRequest::new(&export.spec_text, slots));
        prop_assert_eq!(restored, spec);
    }
}

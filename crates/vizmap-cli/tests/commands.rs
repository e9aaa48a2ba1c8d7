//! Integration tests for the command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use vizmap_cli::commands::{
    RemapOptions, SuggestOptions, TokenizeOptions, TrackOptions, WorkerMode, run_remap,
    run_suggest, run_tokenize, run_track,
};
use vizmap_cli::summary::completeness_line;
use vizmap_model::{DataType, DatasetField, TemplateInformation, TemplateUsermeta};
use vizmap_worker::WorkerConfig;

const SPEC: &str = r#"{"mark":"bar","encoding":{"x":{"field":"Category"},"y":{"field":"Sales"}}}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn write_fields(dir: &Path, name: &str, fields: &[DatasetField]) -> PathBuf {
    write(dir, name, &serde_json::to_string(fields).unwrap())
}

fn old_fields() -> Vec<DatasetField> {
    vec![
        DatasetField::column("Old.Category", "Category", DataType::Text),
        DatasetField::measure("Sum(Old.Sales)", "Sales", DataType::Numeric),
    ]
}

fn new_fields() -> Vec<DatasetField> {
    vec![
        DatasetField::column("New.category", "category", DataType::Text),
        DatasetField::measure("Sum(New.Sales)", "Sales", DataType::Numeric),
        DatasetField::measure("Sum(New.Units)", "Units", DataType::Numeric),
    ]
}

#[test]
fn tokenize_suggest_remap_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write(dir.path(), "spec.json", SPEC);
    let fields = write_fields(dir.path(), "fields.json", &old_fields());
    let tokenized = dir.path().join("template.json");
    let usermeta = dir.path().join("usermeta.json");

    let exported = run_tokenize(&TokenizeOptions {
        spec,
        fields,
        output: Some(tokenized.clone()),
        usermeta: Some(usermeta.clone()),
        tracked: None,
        information: TemplateInformation {
            name: "bars".to_string(),
            ..TemplateInformation::default()
        },
    })
    .unwrap();
    assert_eq!(exported.usermeta.dataset.len(), 2);
    insta::assert_snapshot!(
        fs::read_to_string(&tokenized).unwrap(),
        @r#"{"mark":"bar","encoding":{"x":{"field":"__0__"},"y":{"field":"__1__"}}}"#
    );

    let new_fields = write_fields(dir.path(), "new_fields.json", &new_fields());
    let assigned = dir.path().join("assigned.json");
    let suggestions = run_suggest(&SuggestOptions {
        usermeta,
        fields: new_fields.clone(),
        output: Some(assigned.clone()),
        min_confidence: 0.75,
    })
    .unwrap();
    assert_eq!(suggestions.suggestions.len(), 2);
    assert!(suggestions.unassigned_slots.is_empty());
    let saved: TemplateUsermeta =
        serde_json::from_str(&fs::read_to_string(&assigned).unwrap()).unwrap();
    assert_eq!(saved.information.name, "bars");
    assert!(saved.unassigned().next().is_none());

    let output = dir.path().join("remapped.json");
    let outcome = run_remap(
        &RemapOptions {
            spec: tokenized,
            usermeta: assigned,
            fields: new_fields,
            tracked: None,
            output: Some(output.clone()),
            has_drilldown: false,
            worker: WorkerMode::Thread,
        },
        &WorkerConfig::default(),
    )
    .unwrap();
    insta::assert_snapshot!(
        fs::read_to_string(&output).unwrap(),
        @r#"{"mark":"bar","encoding":{"x":{"field":"category"},"y":{"field":"Sales"}}}"#
    );
    insta::assert_snapshot!(
        completeness_line(&outcome.completeness, &outcome.tracked_drilldown),
        @"fields assigned: yes, drilldown: not used, complete: yes"
    );
    assert_eq!(outcome.tracked_fields.len(), 2);
}

#[test]
fn track_reports_registry() {
    let dir = tempfile::tempdir().unwrap();
    let response = run_track(&TrackOptions {
        spec: write(dir.path(), "spec.json", SPEC),
        fields: write_fields(dir.path(), "fields.json", &old_fields()),
        previous: None,
        reset: true,
        has_drilldown: false,
    })
    .unwrap();
    let keys: Vec<&str> = response.tracked_fields.keys().collect();
    assert_eq!(keys, vec!["Old.Category", "Sum(Old.Sales)"]);
}

#[test]
fn missing_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let error = run_track(&TrackOptions {
        spec: missing.clone(),
        fields: missing.clone(),
        previous: None,
        reset: false,
        has_drilldown: false,
    })
    .unwrap_err();
    assert!(format!("{error:#}").contains("nope.json"));
}

//! Command implementations.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, trace, warn};
use vizmap_engine::{
    AssignmentResult, TrackingRequest, TrackingResponse, export_template, suggest_assignments,
    track, unassigned_keys,
};
use vizmap_model::{DatasetField, TemplateInformation, TemplateUsermeta, TrackedFields};
use vizmap_worker::{
    BlockingTransport, EditorSurface, InlineTransport, NoObserver, RemapInput, RemapOutcome,
    RemapWorkflow, Transport, WorkerConfig, WorkerDispatcher,
};

use crate::logging::spec_excerpt;

/// How remap jobs reach the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerMode {
    #[default]
    Inline,
    Blocking,
    Thread,
}

#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub spec: PathBuf,
    pub fields: PathBuf,
    pub previous: Option<PathBuf>,
    pub reset: bool,
    pub has_drilldown: bool,
}

#[derive(Debug, Clone)]
pub struct TokenizeOptions {
    pub spec: PathBuf,
    pub fields: PathBuf,
    pub output: Option<PathBuf>,
    pub usermeta: Option<PathBuf>,
    pub tracked: Option<PathBuf>,
    pub information: TemplateInformation,
}

#[derive(Debug, Clone)]
pub struct SuggestOptions {
    pub usermeta: PathBuf,
    pub fields: PathBuf,
    pub output: Option<PathBuf>,
    pub min_confidence: f32,
}

#[derive(Debug, Clone)]
pub struct RemapOptions {
    pub spec: PathBuf,
    pub usermeta: PathBuf,
    pub fields: PathBuf,
    pub tracked: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub has_drilldown: bool,
    pub worker: WorkerMode,
}

pub struct TokenizeResult {
    pub usermeta: TemplateUsermeta,
    pub tracked_fields: TrackedFields,
}

pub fn run_track(options: &TrackOptions) -> Result<TrackingResponse> {
    let spec = read_text(&options.spec)?;
    let fields: Vec<DatasetField> = read_json(&options.fields)?;
    let previous: TrackedFields = match &options.previous {
        Some(path) => read_json(path)?,
        None => TrackedFields::new(),
    };
    trace!(spec = %spec_excerpt(&spec), "tracking");
    let response = track(
        &TrackingRequest::new(spec, fields)
            .with_previous(previous)
            .with_drilldown(options.has_drilldown)
            .with_reset(options.reset),
    );
    info!(
        fields = response.tracked_fields.len(),
        drilldown = response.tracked_drilldown.is_current,
        "tracked specification"
    );
    Ok(response)
}

pub fn run_tokenize(options: &TokenizeOptions) -> Result<TokenizeResult> {
    let spec = read_text(&options.spec)?;
    let fields: Vec<DatasetField> = read_json(&options.fields)?;
    trace!(spec = %spec_excerpt(&spec), "tokenizing");
    let export = export_template(&spec, &fields, options.information.clone());

    write_output(options.output.as_deref(), &export.spec_text)?;
    if let Some(path) = &options.usermeta {
        write_json(path, &export.usermeta)?;
    }
    if let Some(path) = &options.tracked {
        write_json(path, &export.tracked_fields)?;
    }
    info!(slots = export.usermeta.dataset.len(), "exported template");
    Ok(TokenizeResult {
        usermeta: export.usermeta,
        tracked_fields: export.tracked_fields,
    })
}

pub fn run_suggest(options: &SuggestOptions) -> Result<AssignmentResult> {
    let mut usermeta: TemplateUsermeta = read_json(&options.usermeta)?;
    let fields: Vec<DatasetField> = read_json(&options.fields)?;
    let result = suggest_assignments(&usermeta, &fields, options.min_confidence);
    let applied = result.apply(&mut usermeta.dataset);
    if let Some(path) = &options.output {
        write_json(path, &usermeta)?;
    }
    info!(
        applied,
        unassigned = result.unassigned_slots.len(),
        "suggested assignments"
    );
    Ok(result)
}

pub fn run_remap(options: &RemapOptions, worker: &WorkerConfig) -> Result<RemapOutcome> {
    let spec = read_text(&options.spec)?;
    let usermeta: TemplateUsermeta = read_json(&options.usermeta)?;
    let known_fields: Vec<DatasetField> = read_json(&options.fields)?;
    let tracked_fields: TrackedFields = match &options.tracked {
        Some(path) => read_json(path)?,
        None => TrackedFields::new(),
    };
    let missing = unassigned_keys(&usermeta.dataset);
    if !missing.is_empty() {
        warn!(slots = ?missing, "remapping with unassigned slots");
    }
    let input = RemapInput {
        spec_text: spec,
        known_fields,
        tracked_fields,
        remap_fields: usermeta.dataset,
        has_drilldown: options.has_drilldown,
    };
    let mut editor = OutputEditor::new(options.output.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("start async runtime")?;
    let outcome = match options.worker {
        WorkerMode::Inline => runtime.block_on(remap_with(input, &InlineTransport, &mut editor)),
        WorkerMode::Blocking => {
            runtime.block_on(remap_with(input, &BlockingTransport, &mut editor))
        }
        WorkerMode::Thread => {
            let dispatcher = WorkerDispatcher::spawn(worker).context("start worker thread")?;
            runtime.block_on(remap_with(input, &dispatcher, &mut editor))
        }
    }?;
    info!(
        complete = outcome.completeness.is_complete(),
        fingerprint = %outcome.fingerprint,
        "remapped specification"
    );
    Ok(outcome)
}

async fn remap_with<T: Transport>(
    input: RemapInput,
    transport: &T,
    editor: &mut OutputEditor,
) -> Result<RemapOutcome> {
    let mut workflow = RemapWorkflow::new();
    let outcome = workflow
        .run(input, transport, editor, &mut NoObserver)
        .await
        .context("remap workflow failed")?;
    workflow.acknowledge()?;
    Ok(outcome)
}

/// Writes the remapped text to a file, or stdout when no path is set.
pub struct OutputEditor {
    path: Option<PathBuf>,
}

impl OutputEditor {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl EditorSurface for OutputEditor {
    type Error = io::Error;

    fn set_text(&mut self, text: &str) -> Result<(), Self::Error> {
        match &self.path {
            Some(path) => fs::write(path, text),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.write_all(b"\n")
            }
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text).with_context(|| format!("write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

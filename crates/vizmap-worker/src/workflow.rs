//! Remap workflow state machine.
//!
//! A remap runs as a fixed sequence of jobs. Each stage issues its job only
//! after the previous response arrived:
//!
//! ```text
//! None -> Tokenizing -> Replacing -> Tracking -> UpdatingEditor -> Complete
//! ```
//!
//! `acknowledge` returns a completed workflow to `None`; `abandon` returns
//! from any state. A failure in any stage abandons the workflow before the
//! error reaches the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, debug_span, info, warn};
use vizmap_engine::{
    RemapCompleteness, RemappingRequest, SpecFingerprint, TokenizationRequest, TrackingRequest,
    TrackingResponse,
};
use vizmap_model::{DatasetField, TrackedDrilldown, TrackedFields, UsermetaDatasetField};

use crate::error::WorkflowError;
use crate::job::{JobId, JobKind, JobRequest, JobResult};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemapState {
    #[default]
    None,
    Tokenizing,
    Replacing,
    Tracking,
    UpdatingEditor,
    Complete,
}

impl RemapState {
    pub const ORDER: [RemapState; 6] = [
        RemapState::None,
        RemapState::Tokenizing,
        RemapState::Replacing,
        RemapState::Tracking,
        RemapState::UpdatingEditor,
        RemapState::Complete,
    ];

    pub fn index(self) -> usize {
        match self {
            RemapState::None => 0,
            RemapState::Tokenizing => 1,
            RemapState::Replacing => 2,
            RemapState::Tracking => 3,
            RemapState::UpdatingEditor => 4,
            RemapState::Complete => 5,
        }
    }

    /// True once the workflow has moved beyond `stage`.
    pub fn has_passed(self, stage: RemapState) -> bool {
        self.index() > stage.index()
    }

    pub fn is_running(self) -> bool {
        !matches!(self, RemapState::None | RemapState::Complete)
    }

    pub fn next(self) -> Option<RemapState> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RemapState::None => "none",
            RemapState::Tokenizing => "tokenizing",
            RemapState::Replacing => "replacing",
            RemapState::Tracking => "tracking",
            RemapState::UpdatingEditor => "updatingEditor",
            RemapState::Complete => "complete",
        }
    }

    fn can_move_to(self, to: RemapState) -> bool {
        to == RemapState::None || self.next() == Some(to)
    }
}

impl fmt::Display for RemapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the final specification text.
pub trait EditorSurface {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_text(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Progress notifications emitted while the workflow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    State(RemapState),
    Sent { job_id: JobId, kind: JobKind },
    Received { job_id: JobId, kind: JobKind },
}

pub trait WorkflowObserver {
    fn on_event(&mut self, event: &WorkflowEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl WorkflowObserver for NoObserver {
    fn on_event(&mut self, _event: &WorkflowEvent) {}
}

impl<F: FnMut(&WorkflowEvent)> WorkflowObserver for F {
    fn on_event(&mut self, event: &WorkflowEvent) {
        self(event);
    }
}

/// Everything a remap needs from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RemapInput {
    pub spec_text: String,
    /// Fields of the dataset the template is applied to.
    pub known_fields: Vec<DatasetField>,
    /// Registry the current text was tracked with.
    pub tracked_fields: TrackedFields,
    pub remap_fields: Vec<UsermetaDatasetField>,
    pub has_drilldown: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemapOutcome {
    pub spec_text: String,
    pub tracked_fields: TrackedFields,
    pub tracked_drilldown: TrackedDrilldown,
    pub completeness: RemapCompleteness,
    /// Fingerprint of the input the outcome was computed from.
    pub fingerprint: SpecFingerprint,
}

#[derive(Debug, Default)]
pub struct RemapWorkflow {
    state: RemapState,
    history: Vec<RemapState>,
}

impl RemapWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RemapState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[RemapState] {
        &self.history
    }

    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        if self.state != RemapState::Complete {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                to: RemapState::None,
            });
        }
        self.transition(RemapState::None, &mut NoObserver)
    }

    pub fn abandon(&mut self) {
        if self.state != RemapState::None {
            warn!(from = %self.state, "abandoning remap");
            self.state = RemapState::None;
            self.history.push(RemapState::None);
        }
    }

    /// Runs a complete remap of `input` through `transport`.
    pub async fn run<T, E, O>(
        &mut self,
        input: RemapInput,
        transport: &T,
        editor: &mut E,
        observer: &mut O,
    ) -> Result<RemapOutcome, WorkflowError>
    where
        T: Transport,
        E: EditorSurface,
        O: WorkflowObserver,
    {
        if self.state != RemapState::None {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                to: RemapState::Tokenizing,
            });
        }
        match self.drive(input, transport, editor, observer).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.abandon();
                observer.on_event(&WorkflowEvent::State(RemapState::None));
                Err(error)
            }
        }
    }

    async fn drive<T, E, O>(
        &mut self,
        input: RemapInput,
        transport: &T,
        editor: &mut E,
        observer: &mut O,
    ) -> Result<RemapOutcome, WorkflowError>
    where
        T: Transport,
        E: EditorSurface,
        O: WorkflowObserver,
    {
        let RemapInput {
            spec_text,
            known_fields,
            tracked_fields,
            remap_fields,
            has_drilldown,
        } = input;
        let fingerprint = SpecFingerprint::compute(&spec_text, &known_fields);

        self.transition(RemapState::Tokenizing, observer)?;
        let tokenized = dispatch(
            transport,
            JobRequest::tokenization(
                TokenizationRequest::new(spec_text, tracked_fields.clone()).for_remap(),
            ),
            observer,
        )
        .await
        .and_then(expect_text)?;

        self.transition(RemapState::Replacing, observer)?;
        let remapped = dispatch(
            transport,
            JobRequest::remapping(
                RemappingRequest::new(tokenized, remap_fields.clone())
                    .with_tracked_fields(tracked_fields.clone()),
            ),
            observer,
        )
        .await
        .and_then(expect_text)?;

        self.transition(RemapState::Tracking, observer)?;
        let TrackingResponse {
            tracked_fields,
            tracked_drilldown,
        } = dispatch(
            transport,
            JobRequest::tracking(
                TrackingRequest::new(remapped.clone(), known_fields)
                    .with_previous(tracked_fields)
                    .with_drilldown(has_drilldown),
            ),
            observer,
        )
        .await
        .and_then(expect_tracking)?;

        self.transition(RemapState::UpdatingEditor, observer)?;
        editor
            .set_text(&remapped)
            .map_err(|e| WorkflowError::Editor(Box::new(e)))?;

        self.transition(RemapState::Complete, observer)?;
        let completeness = RemapCompleteness::evaluate(&remap_fields, &tracked_drilldown);
        info!(
            fields = tracked_fields.len(),
            complete = completeness.is_complete(),
            "remap finished"
        );
        Ok(RemapOutcome {
            spec_text: remapped,
            tracked_fields,
            tracked_drilldown,
            completeness,
            fingerprint,
        })
    }

    fn transition<O: WorkflowObserver>(
        &mut self,
        to: RemapState,
        observer: &mut O,
    ) -> Result<(), WorkflowError> {
        if !self.state.can_move_to(to) {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(from = %self.state, %to, "remap state");
        self.state = to;
        self.history.push(to);
        observer.on_event(&WorkflowEvent::State(to));
        Ok(())
    }
}

/// A job response reduced to what the next stage consumes.
struct Answer {
    job_id: JobId,
    kind: JobKind,
    result: JobResult,
}

async fn dispatch<T: Transport, O: WorkflowObserver>(
    transport: &T,
    request: JobRequest,
    observer: &mut O,
) -> Result<Answer, WorkflowError> {
    let job_id = request.job_id;
    let kind = request.kind();
    observer.on_event(&WorkflowEvent::Sent { job_id, kind });
    let span = debug_span!("remap_job", %job_id, kind = kind.as_str());
    let response = transport.send(request).instrument(span).await?;
    if response.job_id != job_id {
        return Err(WorkflowError::UnexpectedResponse {
            job_id,
            expected: kind,
            actual: format!("reply for job {}", response.job_id),
        });
    }
    observer.on_event(&WorkflowEvent::Received { job_id, kind });
    Ok(Answer {
        job_id,
        kind,
        result: response.result,
    })
}

fn expect_text(answer: Answer) -> Result<String, WorkflowError> {
    match answer.result {
        JobResult::Tokenization {
            rewritten_spec_text,
        } if answer.kind == JobKind::Tokenization => Ok(rewritten_spec_text),
        JobResult::Remapping {
            rewritten_spec_text,
        } if answer.kind == JobKind::Remapping => Ok(rewritten_spec_text),
        other => Err(unexpected(answer.job_id, answer.kind, other)),
    }
}

fn expect_tracking(answer: Answer) -> Result<TrackingResponse, WorkflowError> {
    match answer.result {
        JobResult::Tracking(response) => Ok(response),
        other => Err(unexpected(answer.job_id, answer.kind, other)),
    }
}

fn unexpected(job_id: JobId, expected: JobKind, result: JobResult) -> WorkflowError {
    match result {
        JobResult::Failed { message } => WorkflowError::JobFailed {
            kind: expected,
            message,
        },
        other => WorkflowError::UnexpectedResponse {
            job_id,
            expected,
            actual: other
                .kind()
                .map_or_else(|| "failure".to_string(), |kind| kind.to_string()),
        },
    }
}

//! Error types for the job transport and the remap workflow.

use thiserror::Error;

use crate::job::{JobId, JobKind};
use crate::workflow::RemapState;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode job {message}")]
    Encode {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode job {message}")]
    Decode {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("job {0} is already pending")]
    DuplicateJob(JobId),

    #[error("worker stopped before answering job {0}")]
    WorkerGone(JobId),

    #[error("failed to start worker thread")]
    Spawn(#[source] std::io::Error),

    #[error("blocking job task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid remap transition from {from} to {to}")]
    InvalidTransition { from: RemapState, to: RemapState },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("expected a {expected} response for job {job_id}, got {actual}")]
    UnexpectedResponse {
        job_id: JobId,
        expected: JobKind,
        actual: String,
    },

    #[error("{kind} job failed: {message}")]
    JobFailed { kind: JobKind, message: String },

    #[error("failed to update the editor")]
    Editor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

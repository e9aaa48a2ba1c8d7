//! Job protocol exchanged between callers and the worker.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vizmap_engine::{RemappingRequest, TokenizationRequest, TrackingRequest, TrackingResponse};

/// Correlates a request with its single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    Tracking,
    Tokenization,
    Remapping,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Tracking => "tracking",
            JobKind::Tokenization => "tokenization",
            JobKind::Remapping => "remapping",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "request", rename_all = "camelCase")]
pub enum JobPayload {
    Tracking(TrackingRequest),
    Tokenization(TokenizationRequest),
    Remapping(RemappingRequest),
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::Tracking(_) => JobKind::Tracking,
            JobPayload::Tokenization(_) => JobKind::Tokenization,
            JobPayload::Remapping(_) => JobKind::Remapping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "camelCase")]
pub enum JobResult {
    Tracking(TrackingResponse),
    #[serde(rename_all = "camelCase")]
    Tokenization { rewritten_spec_text: String },
    #[serde(rename_all = "camelCase")]
    Remapping { rewritten_spec_text: String },
    /// The worker could not run the job, e.g. its bytes did not decode.
    Failed { message: String },
}

impl JobResult {
    /// Kind of job this result answers, `None` for failures.
    pub fn kind(&self) -> Option<JobKind> {
        match self {
            JobResult::Tracking(_) => Some(JobKind::Tracking),
            JobResult::Tokenization { .. } => Some(JobKind::Tokenization),
            JobResult::Remapping { .. } => Some(JobKind::Remapping),
            JobResult::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub job_id: JobId,
    pub payload: JobPayload,
}

impl JobRequest {
    /// Wraps `payload` under a fresh job id.
    pub fn new(payload: JobPayload) -> Self {
        Self {
            job_id: JobId::new(),
            payload,
        }
    }

    pub fn tracking(request: TrackingRequest) -> Self {
        Self::new(JobPayload::Tracking(request))
    }

    pub fn tokenization(request: TokenizationRequest) -> Self {
        Self::new(JobPayload::Tokenization(request))
    }

    pub fn remapping(request: RemappingRequest) -> Self {
        Self::new(JobPayload::Remapping(request))
    }

    pub fn kind(&self) -> JobKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: JobId,
    pub result: JobResult,
}

impl JobResponse {
    pub fn failed(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            result: JobResult::Failed {
                message: message.into(),
            },
        }
    }
}

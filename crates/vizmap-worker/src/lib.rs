//! Job protocol, transports and the remap workflow.
//!
//! Engine operations are synchronous; this crate moves them off the caller's
//! task. [`InlineTransport`] runs a job in place, [`BlockingTransport`] uses
//! tokio's blocking pool and [`WorkerDispatcher`] feeds one long-lived worker
//! thread through a channel of encoded byte buffers.

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod job;
pub mod transport;
pub mod workflow;

pub use codec::{decode_request, decode_response, encode_request, encode_response};
pub use config::WorkerConfig;
pub use dispatcher::WorkerDispatcher;
pub use error::{CodecError, TransportError, WorkflowError};
pub use handler::{handle_bytes, handle_payload, handle_request};
pub use job::{JobId, JobKind, JobPayload, JobRequest, JobResponse, JobResult};
pub use transport::{BlockingTransport, InlineTransport, Transport};
pub use workflow::{
    EditorSurface, NoObserver, RemapInput, RemapOutcome, RemapState, RemapWorkflow,
    WorkflowEvent, WorkflowObserver,
};

//! Request/response transports.
//!
//! A transport moves a [`JobRequest`] to wherever the engine runs and hands
//! back exactly one [`JobResponse`] for it.

use std::future::Future;

use tracing::error;

use crate::error::TransportError;
use crate::handler::handle_request;
use crate::job::{JobRequest, JobResponse};

pub trait Transport {
    fn send(
        &self,
        request: JobRequest,
    ) -> impl Future<Output = Result<JobResponse, TransportError>> + Send;
}

/// Runs every job on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTransport;

impl Transport for InlineTransport {
    async fn send(&self, request: JobRequest) -> Result<JobResponse, TransportError> {
        Ok(handle_request(request))
    }
}

/// Runs each job on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingTransport;

impl Transport for BlockingTransport {
    async fn send(&self, request: JobRequest) -> Result<JobResponse, TransportError> {
        let job_id = request.job_id;
        tokio::task::spawn_blocking(move || handle_request(request))
            .await
            .map_err(|e| {
                error!(%job_id, "job task panicked: {e}");
                TransportError::Join(e.to_string())
            })
    }
}

//! Single long-lived worker thread fed through a channel.
//!
//! Requests travel to the worker as encoded byte buffers. The worker answers
//! each with an encoded response, which the reply router decodes and hands to
//! the caller waiting on that job id. Every id is resolved at most once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::codec::{decode_response, encode_request};
use crate::config::WorkerConfig;
use crate::error::TransportError;
use crate::handler::handle_bytes;
use crate::job::{JobId, JobRequest, JobResponse};
use crate::transport::Transport;

struct Envelope {
    job_id: JobId,
    bytes: Vec<u8>,
}

/// Pending callers keyed by job id.
#[derive(Default)]
pub(crate) struct ReplyRouter {
    pending: Mutex<HashMap<JobId, oneshot::Sender<JobResponse>>>,
}

impl ReplyRouter {
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, oneshot::Sender<JobResponse>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, job_id: JobId) -> Result<oneshot::Receiver<JobResponse>, TransportError> {
        let mut pending = self.lock();
        if pending.contains_key(&job_id) {
            return Err(TransportError::DuplicateJob(job_id));
        }
        let (sender, receiver) = oneshot::channel();
        pending.insert(job_id, sender);
        Ok(receiver)
    }

    fn forget(&self, job_id: JobId) {
        self.lock().remove(&job_id);
    }

    /// Delivers an encoded reply. Returns false when it was dropped.
    pub(crate) fn resolve(&self, bytes: &[u8]) -> bool {
        let response = match decode_response(bytes) {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "dropping undecodable reply");
                return false;
            }
        };
        let job_id = response.job_id;
        let Some(sender) = self.lock().remove(&job_id) else {
            warn!(%job_id, "dropping reply for unknown or already resolved job");
            return false;
        };
        if sender.send(response).is_err() {
            debug!(%job_id, "caller stopped waiting for reply");
        }
        true
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Transport backed by one dedicated worker thread.
///
/// Dropping the dispatcher closes the queue and joins the worker after it
/// finishes the jobs already queued.
pub struct WorkerDispatcher {
    requests: Option<mpsc::Sender<Envelope>>,
    router: Arc<ReplyRouter>,
    worker: Option<JoinHandle<()>>,
}

impl WorkerDispatcher {
    pub fn spawn(config: &WorkerConfig) -> Result<Self, TransportError> {
        let (requests, mut queue) = mpsc::channel::<Envelope>(config.effective_capacity());
        let router = Arc::new(ReplyRouter::default());
        let worker_router = Arc::clone(&router);
        let worker = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                while let Some(Envelope { job_id, bytes }) = queue.blocking_recv() {
                    match handle_bytes(job_id, &bytes) {
                        Ok(reply) => {
                            worker_router.resolve(&reply);
                        }
                        Err(error) => {
                            warn!(%job_id, %error, "failed to encode reply");
                            worker_router.forget(job_id);
                        }
                    }
                }
                debug!("worker queue closed");
            })
            .map_err(TransportError::Spawn)?;
        debug!(
            thread = %config.thread_name,
            capacity = config.effective_capacity(),
            "started worker"
        );
        Ok(Self {
            requests: Some(requests),
            router,
            worker: Some(worker),
        })
    }

    /// Jobs sent and not yet answered.
    pub fn pending_jobs(&self) -> usize {
        self.router.len()
    }
}

impl Transport for WorkerDispatcher {
    async fn send(&self, request: JobRequest) -> Result<JobResponse, TransportError> {
        let job_id = request.job_id;
        let Some(requests) = self.requests.as_ref() else {
            return Err(TransportError::WorkerGone(job_id));
        };
        let bytes = encode_request(&request)?;
        let reply = self.router.register(job_id)?;
        if requests.send(Envelope { job_id, bytes }).await.is_err() {
            self.router.forget(job_id);
            return Err(TransportError::WorkerGone(job_id));
        }
        reply.await.map_err(|_| TransportError::WorkerGone(job_id))
    }
}

impl Drop for WorkerDispatcher {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("worker thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_response;

    #[test]
    fn resolves_each_job_once() {
        let router = ReplyRouter::default();
        let job_id = JobId::new();
        let mut receiver = router.register(job_id).unwrap();
        let reply = encode_response(&JobResponse::failed(job_id, "x")).unwrap();

        assert!(router.resolve(&reply));
        assert!(!router.resolve(&reply));
        assert_eq!(receiver.try_recv().unwrap().job_id, job_id);
    }

    #[test]
    fn orphan_replies_are_dropped() {
        let router = ReplyRouter::default();
        let reply = encode_response(&JobResponse::failed(JobId::new(), "x")).unwrap();
        assert!(!router.resolve(&reply));
        assert!(!router.resolve(b"not a reply"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let router = ReplyRouter::default();
        let job_id = JobId::new();
        let _receiver = router.register(job_id).unwrap();
        assert!(matches!(
            router.register(job_id),
            Err(TransportError::DuplicateJob(id)) if id == job_id
        ));
        assert_eq!(router.len(), 1);
    }
}

//! Runs jobs against the engine.
//!
//! This is the only place engine operations are invoked; transports just
//! move requests and responses around.

use tracing::{debug, warn};
use vizmap_engine::{remap, tokenize, track};

use crate::codec::{decode_request, encode_response};
use crate::error::CodecError;
use crate::job::{JobId, JobPayload, JobRequest, JobResponse, JobResult};

pub fn handle_request(request: JobRequest) -> JobResponse {
    let JobRequest { job_id, payload } = request;
    let kind = payload.kind();
    let result = handle_payload(&payload);
    debug!(%job_id, kind = kind.as_str(), "handled job");
    JobResponse { job_id, result }
}

pub fn handle_payload(payload: &JobPayload) -> JobResult {
    match payload {
        JobPayload::Tracking(request) => JobResult::Tracking(track(request)),
        JobPayload::Tokenization(request) => JobResult::Tokenization {
            rewritten_spec_text: tokenize(request),
        },
        JobPayload::Remapping(request) => JobResult::Remapping {
            rewritten_spec_text: remap(request),
        },
    }
}

/// Decodes, runs and encodes one job.
///
/// A request that does not decode is answered with a failed response for
/// `job_id`, so the caller waiting on it is always released.
pub fn handle_bytes(job_id: JobId, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let response = match decode_request(bytes) {
        Ok(request) if request.job_id == job_id => handle_request(request),
        Ok(request) => {
            warn!(%job_id, embedded = %request.job_id, "job id mismatch in request");
            JobResponse::failed(job_id, "job id does not match its envelope")
        }
        Err(error) => {
            warn!(%job_id, %error, "undecodable job request");
            JobResponse::failed(job_id, error.to_string())
        }
    };
    encode_response(&response)
}

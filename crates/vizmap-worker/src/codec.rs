//! Byte-buffer codec for jobs crossing a thread boundary.
//!
//! Messages are UTF-8 JSON. Field names and spec text may contain any
//! Unicode, so buffers are never truncated or re-encoded on the way.

use crate::error::CodecError;
use crate::job::{JobRequest, JobResponse};

pub fn encode_request(request: &JobRequest) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(request).map_err(|source| CodecError::Encode {
        message: "request",
        source,
    })
}

pub fn decode_request(bytes: &[u8]) -> Result<JobRequest, CodecError> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode {
        message: "request",
        source,
    })
}

pub fn encode_response(response: &JobResponse) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(response).map_err(|source| CodecError::Encode {
        message: "response",
        source,
    })
}

pub fn decode_response(bytes: &[u8]) -> Result<JobResponse, CodecError> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode {
        message: "response",
        source,
    })
}

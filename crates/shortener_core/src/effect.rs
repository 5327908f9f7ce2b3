use serde_json::Value;

use crate::{FieldId, TransportError};

/// Identifies a request: the attachment that issued it and its sequence
/// number within that attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub attachment: u64,
    pub sequence: u64,
}

/// A shortening request for the transport: `POST endpoint` with `{url}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenRequest {
    pub field: FieldId,
    pub ticket: Ticket,
    pub endpoint: String,
    pub url: String,
}

/// Outcome of a [`ShortenRequest`], fed back into the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub field: FieldId,
    pub ticket: Ticket,
    pub result: Result<Value, TransportError>,
}

impl Settlement {
    pub fn new(request: &ShortenRequest, result: Result<Value, TransportError>) -> Self {
        Self {
            field: request.field,
            ticket: request.ticket,
            result,
        }
    }
}

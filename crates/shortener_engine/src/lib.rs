//! Shortener engine: sends shortening requests and reports their settlement.
mod engine;
mod transport;
mod types;

pub use engine::{EngineHandle, EventSink};
pub use transport::{ReqwestTransport, Transport};
pub use types::{EngineError, EngineEvent, PayloadEncoding, TransportSettings};

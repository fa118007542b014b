pub mod http;

use thiserror::Error;

pub use http::HttpGateway;

/// Errors reported by the send primitives at the platform boundary.
///
/// `Rejected` and `Unavailable` are ordinary channel-level conditions and are
/// absorbed by the dispatch loop; `Fault` means the transport object itself is
/// unusable and aborts the whole dispatch.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("handler rejected the payload: {0}")]
    Rejected(String),

    #[error("handler unavailable: {0}")]
    Unavailable(String),

    #[error("transport fault: {0}")]
    Fault(String),
}
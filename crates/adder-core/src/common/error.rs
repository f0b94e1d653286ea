//! Error types for the adder service.
//!
//! This module defines the central `Error` enum, which captures every
//! reportable failure between the wire and the handler. It implements
//! `From<Error>` for `tonic::Status` so failures propagate to callers with the
//! matching gRPC status code.
//!
//! ## Error Cases
//! - `ChannelError`: An internal communication failure between the gRPC task
//!   and a worker.
//! - `MalformedRequest`: The payload could not be decoded into a message.
//! - `RequestCancelled`: The worker dropped the call before answering.
//! - `ServiceShutdown`: A call arrived while the service was shutting down.
//!
//! The handler itself has no failure mode, so there is no variant for it.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the adder service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The payload was not a valid protobuf encoding of the expected message.
    #[error("Malformed request: {reason}")]
    MalformedRequest { reason: String },

    /// The call was dropped before a response was produced.
    #[error("Request cancelled")]
    RequestCancelled,

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::ChannelError { context } => Status::internal(format!("Channel error: {context}")),
            Error::MalformedRequest { reason } => {
                Status::invalid_argument(format!("Malformed request: {reason}"))
            }
            Error::RequestCancelled => Status::cancelled("Request was cancelled"),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

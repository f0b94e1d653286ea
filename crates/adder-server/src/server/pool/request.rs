use adder_core::{Operands, Sum};
use tokio::sync::oneshot;

/// A unit of work sent to a single worker.
#[derive(Debug)]
pub enum WorkRequest {
    /// Add the operands and answer on `response`.
    ///
    /// The receiving half is owned by the gRPC call; if the caller has gone
    /// away the send fails and the result is discarded.
    Add {
        operands: Operands,
        response: oneshot::Sender<Sum>,
    },
    /// Stop the worker loop and acknowledge on `response`.
    Shutdown { response: oneshot::Sender<()> },
}

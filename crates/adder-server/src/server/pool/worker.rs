use crate::server::pool::request::WorkRequest;
use adder_core::Adder;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Worker task responsible for processing [`WorkRequest`] messages.
///
/// Each worker holds a shared handle to the handler and executes one call at
/// a time, so the number of workers bounds the number of concurrently
/// running handler invocations. The loop runs until it receives
/// [`WorkRequest::Shutdown`] or every sender is dropped.
///
/// # Request Types
///
/// - [`WorkRequest::Add`] - invoke the handler and send the sum back.
/// - [`WorkRequest::Shutdown`] - acknowledge and stop.
pub async fn worker_loop<H: Adder>(
    worker_id: usize,
    mut rx: mpsc::Receiver<WorkRequest>,
    handler: Arc<H>,
) {
    tracing::trace!("Worker {worker_id} started");

    while let Some(work) = rx.recv().await {
        match work {
            WorkRequest::Add { operands, response } => {
                // Skip the handler when the caller already hung up.
                if response.is_closed() {
                    tracing::debug!("Worker {worker_id}: caller went away before dispatch");
                    continue;
                }

                let sum = handler.add(operands);

                if response.send(sum).is_err() {
                    tracing::debug!("Worker {worker_id}: caller went away, dropping result");
                }
            }
            WorkRequest::Shutdown { response } => {
                tracing::debug!("Worker {worker_id} received shutdown signal");

                if response.send(()).is_err() {
                    tracing::error!("Worker {worker_id} failed to acknowledge shutdown");
                }
                break;
            }
        }
    }

    tracing::trace!("Worker {worker_id} stopped");
}

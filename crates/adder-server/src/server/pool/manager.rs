//! Asynchronous worker pool for handler invocations.
//!
//! This module defines the [`WorkerPool`] struct, which owns a fixed set of
//! worker tasks, each executing one handler invocation at a time. Work is
//! distributed round-robin, and shutdown is coordinated through a shared
//! [`CancellationToken`].
//!
//! Each worker listens on its own bounded [`mpsc::Receiver`] of depth 1, so
//! the pool never runs more than `num_workers` handler invocations at once
//! and needs no locking.

use crate::server::{
    pool::request::WorkRequest,
    pool::worker::worker_loop,
    telemetry::{decrement_calls_inflight, increment_calls_inflight, record_call_duration},
};
use adder_core::{Adder, Error, Operands, Sum};
use anyhow::ensure;
use core::time::Duration;
use portable_atomic::{AtomicUsize, Ordering};
use std::{sync::Arc, time::Instant};
use tokio::{
    sync::{mpsc, oneshot},
    time::{sleep, timeout},
};
use tokio_util::sync::CancellationToken;

/// A cooperative pool of asynchronous workers that process [`WorkRequest`]s.
pub struct WorkerPool {
    workers: Vec<mpsc::Sender<WorkRequest>>,
    next_worker: AtomicUsize,
    inflight: Arc<AtomicUsize>,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    /// Spawns `num_workers` worker tasks sharing `handler`.
    ///
    /// Must be called from within a Tokio runtime. Fails if `num_workers` is
    /// zero.
    pub fn spawn<H: Adder>(
        handler: H,
        num_workers: usize,
        shutdown_timeout: Duration,
    ) -> anyhow::Result<Self> {
        ensure!(num_workers > 0, "max_concurrent_calls must be greater than 0");

        let handler = Arc::new(handler);
        let mut workers = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            // One queued request per worker: a call waits in `send` until its
            // worker is free rather than piling up behind it.
            let (tx, rx) = mpsc::channel(1);
            workers.push(tx);
            tokio::spawn(worker_loop(worker_id, rx, Arc::clone(&handler)));
        }

        Self::new(workers, CancellationToken::new(), shutdown_timeout)
    }

    /// Constructs a new [`WorkerPool`] from initialized worker channels and a
    /// shared cancellation token. Fails if `workers` is empty.
    pub fn new(
        workers: Vec<mpsc::Sender<WorkRequest>>,
        shutdown_token: CancellationToken,
        shutdown_timeout: Duration,
    ) -> anyhow::Result<Self> {
        ensure!(!workers.is_empty(), "a worker pool needs at least one worker");

        Ok(Self {
            workers,
            next_worker: AtomicUsize::new(0),
            inflight: Arc::new(AtomicUsize::new(0)),
            shutdown_token,
            shutdown_timeout,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Number of calls currently dispatched and not yet answered.
    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Returns the index of the next worker to receive work (round-robin).
    fn next_worker_index(&self) -> usize {
        self.next_worker.fetch_add(1, Ordering::Relaxed) % self.workers.len()
    }

    /// Runs one addition on the next worker and waits for the result.
    ///
    /// If the returned future is dropped (the caller disconnected), the
    /// in-flight count is still released and the worker discards its result.
    ///
    /// # Errors
    ///
    /// - [`Error::ServiceShutdown`] if the pool is shutting down.
    /// - [`Error::ChannelError`] if the worker's channel is closed.
    /// - [`Error::RequestCancelled`] if the worker dropped the call.
    pub async fn dispatch(&self, operands: Operands) -> Result<Sum, Error> {
        if self.is_shutting_down() {
            return Err(Error::ServiceShutdown);
        }

        let _guard = InflightGuard::acquire(&self.inflight);
        let worker_idx = self.next_worker_index();
        let (tx, rx) = oneshot::channel();

        let request = WorkRequest::Add {
            operands,
            response: tx,
        };

        tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => return Err(Error::ServiceShutdown),
            sent = self.workers[worker_idx].send(request) => {
                sent.map_err(|_| Error::ChannelError {
                    context: format!("Worker {worker_idx} channel closed"),
                })?;
            }
        }

        rx.await.map_err(|_| Error::RequestCancelled)
    }

    /// Gracefully shuts down all workers in the pool.
    ///
    /// - Refuses new work.
    /// - Waits up to `shutdown_timeout` for in-flight calls to drain.
    /// - Sends a [`WorkRequest::Shutdown`] to each worker.
    /// - Waits (up to 3 seconds per worker) for shutdown acknowledgements.
    ///
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) -> Result<(), Error> {
        if self.shutdown_token.is_cancelled() {
            return Ok(());
        }

        // Phase 0: stop accepting new work.
        tracing::info!("Refusing new calls");
        self.shutdown_token.cancel();

        // Phase 1: wait for in-flight calls to drain.
        tracing::info!("Draining in-flight calls ({} active)", self.inflight());
        let drain_result = timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        match drain_result {
            Ok(()) => tracing::debug!("All in-flight calls drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} calls still active)",
                self.inflight()
            ),
        }

        // Phase 2: notify workers to shut down.
        tracing::debug!("Notifying all workers to shut down");
        let mut shutdown_handles = Vec::with_capacity(self.workers.len());

        for (i, worker) in self.workers.iter().enumerate() {
            let (tx, rx) = oneshot::channel();
            if let Err(e) = worker.send(WorkRequest::Shutdown { response: tx }).await {
                tracing::error!("Failed to send shutdown to worker {i}: {e}");
            } else {
                shutdown_handles.push((i, rx));
            }
        }

        let acks = shutdown_handles.into_iter().map(|(i, rx)| async move {
            match timeout(Duration::from_secs(3), rx).await {
                Ok(Ok(())) => tracing::trace!("Worker {i} shutdown acknowledged"),
                Ok(Err(e)) => tracing::error!("Worker {i} returned error: {e}"),
                Err(_) => tracing::warn!("Worker {i} shutdown timed out"),
            }
        });

        futures::future::join_all(acks).await;

        tracing::info!("Worker pool shutdown complete");
        Ok(())
    }
}

/// Counts a call as in flight for as long as it is alive.
///
/// The `calls_inflight` gauge and the call duration are updated here too, so
/// a call whose future is dropped mid-dispatch is still accounted for.
struct InflightGuard {
    counter: Arc<AtomicUsize>,
    started: Instant,
}

impl InflightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        increment_calls_inflight();
        Self {
            counter: Arc::clone(counter),
            started: Instant::now(),
        }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
        decrement_calls_inflight();
        record_call_duration(self.started.elapsed().as_secs_f64() * 1000.0);
    }
}

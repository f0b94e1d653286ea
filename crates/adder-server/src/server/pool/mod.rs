//! Bounded pool of worker tasks that execute handler invocations.
//!
//! - [`manager`] - [`WorkerPool`](manager::WorkerPool): spawning, dispatch
//!   and shutdown.
//! - [`worker`] - the per-worker receive loop.
//! - [`request`] - messages sent from the pool to a worker.

pub mod manager;
pub mod request;
pub mod worker;

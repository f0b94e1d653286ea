//! gRPC service implementation for the `Calculator` schema.
//!
//! [`CalculatorService`] implements the generated [`Calculator`] trait. It
//! owns no business logic: `Add` converts the wire message into
//! [`Operands`], hands them to the [`WorkerPool`] and converts the resulting
//! [`Sum`](adder_core::Sum) back. The other operators of the shared schema
//! are served by other processes and answer `UNIMPLEMENTED` here.

use crate::server::{
    config::ServerConfig,
    pool::manager::WorkerPool,
    telemetry::{increment_call_errors, increment_requests},
};
use adder_core::{
    Adder, Error, Operands,
    proto::{Number, TwoNumbers, calculator_server::Calculator},
};
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// gRPC front of the addition handler.
///
/// Cheap to clone; clones share one worker pool.
#[derive(Clone)]
pub struct CalculatorService {
    worker_pool: Arc<WorkerPool>,
}

impl CalculatorService {
    /// Creates a new `CalculatorService` and spawns its worker pool, one
    /// worker per allowed concurrent call.
    ///
    /// Fails if `config.max_concurrent_calls` is zero.
    pub fn new<H: Adder>(config: &ServerConfig, handler: H) -> anyhow::Result<Self> {
        let worker_pool = WorkerPool::spawn(
            handler,
            config.max_concurrent_calls,
            config.shutdown_timeout,
        )?;

        Ok(Self {
            worker_pool: Arc::new(worker_pool),
        })
    }

    /// Number of calls currently executing or waiting for a worker.
    pub fn inflight(&self) -> usize {
        self.worker_pool.inflight()
    }

    /// Drains in-flight calls and stops the worker pool.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.worker_pool.shutdown().await
    }
}

#[tonic::async_trait]
impl Calculator for CalculatorService {
    /// Adds the two operands.
    ///
    /// If `metrics` is enabled, emits request count and errors. In-flight
    /// calls and call duration are recorded by the worker pool.
    #[tracing::instrument(skip_all, fields(a = req.get_ref().a, b = req.get_ref().b))]
    async fn add(&self, req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        increment_requests();

        let operands = Operands::from(req.into_inner());
        let result = self.worker_pool.dispatch(operands).await;

        match result {
            Ok(sum) => {
                tracing::debug!(result = sum.result, "call answered");
                Ok(Response::new(sum.into()))
            }
            Err(e) => {
                increment_call_errors();
                tracing::warn!("Error: {e}");
                Err(e.into())
            }
        }
    }

    async fn subtract(&self, _req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        Err(not_served("Subtract"))
    }

    async fn multiply(&self, _req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        Err(not_served("Multiply"))
    }

    async fn divide(&self, _req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        Err(not_served("Divide"))
    }

    async fn modulus(&self, _req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        Err(not_served("Modulus"))
    }

    async fn exponentiate(&self, _req: Request<TwoNumbers>) -> Result<Response<Number>, Status> {
        Err(not_served("Exponentiate"))
    }
}

fn not_served(method: &str) -> Status {
    Status::unimplemented(format!("{method} is not served by the add server"))
}

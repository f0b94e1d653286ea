//! Server side of the adder service.
//!
//! - [`config`] - CLI/environment configuration.
//! - [`listener`] - bind/serve/stop lifecycle.
//! - [`pool`] - bounded worker pool executing handler invocations.
//! - [`service`] - gRPC glue between the generated trait and the pool.
//! - [`telemetry`] - logging and optional OpenTelemetry export.

pub mod config;
pub mod listener;
pub mod pool;
pub mod service;
pub mod telemetry;

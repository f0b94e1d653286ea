//! gRPC service implementation.
//!
//! - [`handler`] - `Calculator` service entry point (`CalculatorService`).

pub mod handler;

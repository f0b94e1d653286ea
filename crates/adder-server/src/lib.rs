//! # `adder-server`: a gRPC server that adds two numbers
//!
//! Serves the `Add` method of the `calculator.Calculator` service. Each call
//! decodes two doubles, adds them on one of a bounded pool of worker tasks
//! and answers with the sum. See [`adder_core`] for the schema, the handler
//! capability and the numeric policy.
//!
//! ## Highlights
//!
//! - **Bounded concurrency**: at most `max_concurrent_calls` handler
//!   invocations run at once.
//! - **Graceful shutdown**: [`Listener::stop`] stops accepting, lets in-flight
//!   calls finish and then releases the port.
//! - **Health and reflection**: `grpc.health.v1.Health` and server
//!   reflection are served next to the calculator service.
//! - **gRPC-Web and compression**: zstd, gzip and deflate.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use adder_core::Addition;
//! use adder_server::{Listener, ServerConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::with_addr(([127, 0, 0, 1], 0).into(), 4);
//! let mut listener = Listener::start(&config, Addition).await?;
//! println!("serving on {}", listener.local_addr());
//! listener.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod server;

pub use server::{
    config::{CliArgs, ServerConfig},
    listener::{Listener, ListenerState},
};

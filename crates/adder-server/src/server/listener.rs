//! Listener lifecycle: bind, serve, drain, release.
//!
//! A [`Listener`] owns everything a running server holds: the bound TCP
//! socket (moved into the serving task), the worker pool, the health
//! reporter and the shutdown token. It is either [`ListenerState::Serving`]
//! or [`ListenerState::Stopped`]; the only transition is [`Listener::stop`].
//!
//! Stopping happens in this order:
//!
//! 1. health status flips to `NOT_SERVING`;
//! 2. the transport stops accepting connections and lets in-flight calls
//!    finish;
//! 3. the serving task returns, dropping the socket (the port is free);
//! 4. the worker pool drains and its workers exit.

use crate::server::{config::ServerConfig, service::handler::CalculatorService};
use adder_core::{Adder, proto::FILE_DESCRIPTOR_SET, proto::calculator_server::CalculatorServer};
use anyhow::Context;
use core::future::Future;
use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Serving,
    Stopped,
}

/// A running add server bound to a local address.
pub struct Listener {
    local_addr: SocketAddr,
    state: ListenerState,
    service: CalculatorService,
    health_reporter: HealthReporter,
    shutdown_token: CancellationToken,
    server: Option<JoinHandle<Result<(), tonic::transport::Error>>>,
}

impl Listener {
    /// Binds `config.server_addr` and starts serving `handler`.
    ///
    /// Returns once the socket is bound, so callers may connect as soon as
    /// this resolves. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if `config.max_concurrent_calls` is zero or the address cannot
    /// be bound.
    pub async fn start<H: Adder>(config: &ServerConfig, handler: H) -> anyhow::Result<Self> {
        let service = CalculatorService::new(config, handler)?;

        let tcp = TcpListener::bind(config.server_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.server_addr))?;
        let local_addr = tcp.local_addr()?;

        let (health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<CalculatorServer<CalculatorService>>()
            .await;

        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;

        let shutdown_token = CancellationToken::new();

        let router = Server::builder()
            .accept_http1(true)
            .http2_adaptive_window(Some(true))
            .layer(
                ServiceBuilder::new()
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    )
                    .layer(GrpcWebLayer::new()),
            )
            .add_service(health_service)
            .add_service(reflection)
            .add_service(build_calculator_service(service.clone()));

        let incoming = TcpListenerStream::new(tcp);
        let signal = shutdown_token.clone().cancelled_owned();
        let server = tokio::spawn(router.serve_with_incoming_shutdown(incoming, signal));

        tracing::debug!("Listener bound to {local_addr}");

        Ok(Self {
            local_addr,
            state: ListenerState::Serving,
            service,
            health_reporter,
            shutdown_token,
            server: Some(server),
        })
    }

    /// The bound address. When configured with port 0 this carries the port
    /// chosen by the OS.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Serves until `signal` resolves, then stops gracefully.
    pub async fn run_until<F>(mut self, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let server_exited = match self.server.as_mut() {
            Some(server) => {
                tokio::select! {
                    () = signal => None,
                    res = server => Some(res),
                }
            }
            None => return Ok(()),
        };

        match server_exited {
            None => self.stop().await,
            // The transport failed on its own; still release the pool.
            Some(res) => {
                self.server = None;
                self.finish().await?;
                res.context("server task panicked")?
                    .context("transport error")
            }
        }
    }

    /// Stops accepting calls, waits for in-flight calls, releases the port
    /// and stops the worker pool.
    ///
    /// Idempotent: stopping a stopped listener returns `Ok(())`.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        if self.state == ListenerState::Stopped {
            return Ok(());
        }

        tracing::info!("Stopping listener on {}", self.local_addr);
        self.health_reporter
            .set_not_serving::<CalculatorServer<CalculatorService>>()
            .await;
        self.shutdown_token.cancel();

        let served = match self.server.take() {
            Some(server) => server.await,
            None => Ok(Ok(())),
        };

        // The pool is released even if the serving task failed.
        self.finish().await?;
        served
            .context("server task panicked")?
            .context("transport error")?;

        tracing::info!("Listener stopped");
        Ok(())
    }

    async fn finish(&mut self) -> anyhow::Result<()> {
        self.state = ListenerState::Stopped;
        self.shutdown_token.cancel();
        self.service
            .shutdown()
            .await
            .context("worker pool shutdown failed")
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // Without an async context the best we can do is ask the serving
        // task to wind down; it releases the socket when it returns.
        if self.state == ListenerState::Serving {
            self.shutdown_token.cancel();
        }
    }
}

fn build_calculator_service(service: CalculatorService) -> CalculatorServer<CalculatorService> {
    CalculatorServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adder_core::{Addition, proto::TwoNumbers, proto::calculator_server::Calculator};
    use tonic::{Code, Request};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_releases_the_pool_when_the_serving_task_panicked() {
        let config = ServerConfig::with_addr(SocketAddr::from(([127, 0, 0, 1], 0)), 1);
        let mut listener = Listener::start(&config, Addition).await.unwrap();

        let failing = tokio::spawn(async {
            let served: Result<(), tonic::transport::Error> = Ok(());
            if served.is_ok() {
                panic!("serving task failed");
            }
            served
        });
        let serving = listener.server.replace(failing).unwrap();

        let err = listener.stop().await.unwrap_err();
        assert!(err.to_string().contains("server task panicked"));
        assert_eq!(listener.state(), ListenerState::Stopped);

        let status = listener
            .service
            .add(Request::new(TwoNumbers { a: 1.0, b: 2.0 }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);

        // The real serving task saw the cancellation as well.
        serving.await.unwrap().unwrap();
    }
}

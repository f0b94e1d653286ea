use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default TCP port of the add server.
pub const DEFAULT_PORT: u16 = 50051;

/// Runtime configuration for the `adder-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for running the
/// service as one backend of a calculator deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "adder-server",
    version,
    about = "A gRPC service that adds two numbers"
)]
pub struct CliArgs {
    /// IP address to bind. The default listens on all IPv4 interfaces.
    ///
    /// Environment variable: `BIND_IP`
    #[arg(long, env = "BIND_IP", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_ip: IpAddr,

    /// TCP port to bind. Use 0 to let the OS pick a free port.
    ///
    /// Environment variable: `PORT`
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upper bound on simultaneously executing handler invocations.
    ///
    /// This is the number of worker tasks in the pool. Calls beyond this
    /// bound wait for a worker to free up.
    ///
    /// Environment variable: `MAX_CONCURRENT_CALLS`
    #[arg(long, env = "MAX_CONCURRENT_CALLS", default_value_t = 10)]
    pub max_concurrent_calls: usize,

    /// Seconds to wait for in-flight calls to drain from the worker pool
    /// during shutdown.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,

    /// Emit logs as JSON lines instead of the human-readable format.
    ///
    /// Environment variable: `LOG_JSON`
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub max_concurrent_calls: usize,
    pub shutdown_timeout: Duration,
    pub log_json: bool,
}

impl ServerConfig {
    /// Configuration for an in-process listener on `addr` with `workers`
    /// concurrent calls and otherwise default settings.
    pub fn with_addr(addr: SocketAddr, workers: usize) -> Self {
        Self {
            server_addr: addr,
            max_concurrent_calls: workers,
            shutdown_timeout: Duration::from_secs(3),
            log_json: false,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_concurrent_calls == 0 {
            bail!("MAX_CONCURRENT_CALLS must be greater than 0");
        }

        if args.shutdown_timeout == 0 {
            bail!("SHUTDOWN_TIMEOUT must be greater than 0");
        }

        Ok(Self {
            server_addr: SocketAddr::new(args.bind_ip, args.port),
            max_concurrent_calls: args.max_concurrent_calls,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            log_json: args.log_json,
        })
    }
}

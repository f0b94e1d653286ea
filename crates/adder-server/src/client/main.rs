//! Command-line client for the add server.
//!
//! ```bash
//! adder-client 2 3
//! # Result: 5
//! adder-client --endpoint http://add-server:50051 -- -1 1
//! # Result: 0
//! ```

use adder_core::proto::{TwoNumbers, calculator_client::CalculatorClient};
use clap::Parser;
use core::time::Duration;
use std::process::ExitCode;
use tonic::{Request, codec::CompressionEncoding, transport::Channel};

#[derive(Parser, Debug)]
#[command(name = "adder-client", version, about = "Adds two numbers on a remote add server")]
struct ClientArgs {
    /// Server endpoint.
    ///
    /// Environment variable: `ADDER_ENDPOINT`
    #[arg(long, env = "ADDER_ENDPOINT", default_value = "http://127.0.0.1:50051")]
    endpoint: String,

    /// Call deadline in milliseconds.
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Compress the request with gzip.
    #[arg(long, default_value_t = false)]
    gzip: bool,

    /// First operand.
    #[arg(allow_negative_numbers = true)]
    a: f64,

    /// Second operand.
    #[arg(allow_negative_numbers = true)]
    b: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = ClientArgs::parse();

    match add(&args).await {
        Ok(result) => {
            println!("Result: {}", pretty(result));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn add(args: &ClientArgs) -> anyhow::Result<f64> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let channel = Channel::from_shared(args.endpoint.clone())?
        .connect_timeout(timeout)
        .connect()
        .await?;

    let mut client = CalculatorClient::new(channel)
        .accept_compressed(CompressionEncoding::Gzip);
    if args.gzip {
        client = client.send_compressed(CompressionEncoding::Gzip);
    }

    let mut request = Request::new(TwoNumbers {
        a: args.a,
        b: args.b,
    });
    request.set_timeout(timeout);

    let response = client.add(request).await?;
    Ok(response.into_inner().result)
}

/// Integers print without a fractional part; everything else is rounded to
/// ten decimal places to hide binary representation noise.
fn pretty(n: f64) -> String {
    if !n.is_finite() || n.fract() == 0.0 {
        return format!("{n}");
    }
    let rounded = format!("{n:.10}");
    rounded.trim_end_matches('0').trim_end_matches('.').to_string()
}

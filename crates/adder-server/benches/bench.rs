use adder_core::{
    Addition,
    proto::{TwoNumbers, calculator_client::CalculatorClient},
};
use adder_server::{Listener, ServerConfig};
use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::stream::{FuturesUnordered, StreamExt};
use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};
use tokio::runtime::Builder;
use tonic::transport::Channel;

#[derive(Clone, Copy, Debug)]
struct GrpcBenchParams {
    calls_per_iter: u64,
    concurrency: usize,
}

fn grpc_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    let config = ServerConfig::with_addr(SocketAddr::from(([127, 0, 0, 1], 0)), 16);
    let mut listener = rt.block_on(Listener::start(&config, Addition)).unwrap();
    let endpoint = format!("http://{}", listener.local_addr());

    let calls_per_iter_cases = [1, 100];
    let concurrency_cases = [1, 4, 16, 64];

    let mut cases = Vec::new();
    for &calls_per_iter in &calls_per_iter_cases {
        for &concurrency in &concurrency_cases {
            cases.push(GrpcBenchParams {
                calls_per_iter,
                concurrency,
            });
        }
    }

    let mut group = c.benchmark_group("grpc/add");
    for params in &cases {
        group.throughput(Throughput::Elements(
            params.calls_per_iter * params.concurrency as u64,
        ));

        group.bench_function(
            format!(
                "calls/{}/conc/{}",
                params.calls_per_iter, params.concurrency
            ),
            |b| {
                b.to_async(&rt).iter_custom(|iters| {
                    let endpoint = endpoint.clone();
                    let params = *params;
                    async move {
                        let channel = Channel::from_shared(endpoint)
                            .unwrap()
                            .connect()
                            .await
                            .unwrap();
                        let mut total = Duration::ZERO;
                        for _ in 0..iters {
                            total += run_round(channel.clone(), params).await;
                        }
                        total
                    }
                });
            },
        );
    }
    group.finish();

    rt.block_on(listener.stop()).unwrap();
}

/// Issues `calls_per_iter` calls from each of `concurrency` clients and
/// returns the wall time.
async fn run_round(channel: Channel, params: GrpcBenchParams) -> Duration {
    let start = Instant::now();
    let mut tasks = FuturesUnordered::new();

    for worker in 0..params.concurrency {
        let mut client = CalculatorClient::new(channel.clone());
        tasks.push(async move {
            for i in 0..params.calls_per_iter {
                let resp = client
                    .add(TwoNumbers {
                        a: worker as f64,
                        b: i as f64,
                    })
                    .await
                    .unwrap();
                black_box(resp.into_inner().result);
            }
        });
    }

    while tasks.next().await.is_some() {}
    start.elapsed()
}

criterion_group!(benches, grpc_bench);
criterion_main!(benches);

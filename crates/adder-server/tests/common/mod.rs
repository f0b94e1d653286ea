#![allow(dead_code)]

use adder_core::{
    Adder, Addition, Operands, Sum,
    proto::{TwoNumbers, calculator_client::CalculatorClient},
};
use adder_server::{Listener, ServerConfig};
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tonic::transport::Channel;

pub async fn start<H: Adder>(handler: H, workers: usize) -> Listener {
    let config = ServerConfig::with_addr(SocketAddr::from(([127, 0, 0, 1], 0)), workers);
    Listener::start(&config, handler)
        .await
        .expect("listener should start")
}

pub fn endpoint(listener: &Listener) -> String {
    format!("http://{}", listener.local_addr())
}

pub async fn connect(listener: &Listener) -> CalculatorClient<Channel> {
    CalculatorClient::connect(endpoint(listener))
        .await
        .expect("client should connect")
}

pub async fn add(client: &mut CalculatorClient<Channel>, a: f64, b: f64) -> f64 {
    client
        .add(TwoNumbers { a, b })
        .await
        .expect("add should succeed")
        .into_inner()
        .result
}

/// Counts handler invocations.
#[derive(Default)]
pub struct Counting {
    pub calls: AtomicUsize,
}

impl Counting {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Adder for Counting {
    fn add(&self, operands: Operands) -> Sum {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Addition.add(operands)
    }
}

pub fn counting() -> Arc<Counting> {
    Arc::new(Counting::default())
}

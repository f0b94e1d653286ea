mod common;

use adder_core::{
    Addition,
    codec::ProtoCodec,
    proto::{ADD_METHOD_PATH, Number, TwoNumbers},
};
use bytes::{BufMut, Bytes};
use common::{add, connect, counting, endpoint, start};
use futures::future::join_all;
use prost::Message;
use std::sync::Arc;
use tonic::{
    Code, Request, Status,
    codec::{Codec, EncodeBuf, Encoder},
    codegen::http::uri::PathAndQuery,
    transport::Channel,
};
use tonic_health::pb::{
    HealthCheckRequest, health_check_response::ServingStatus, health_client::HealthClient,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn adds_the_documented_scenarios() {
    let mut listener = start(Addition, 4).await;
    let mut client = connect(&listener).await;

    assert_eq!(add(&mut client, 2.0, 3.0).await, 5.0);
    assert_eq!(add(&mut client, -1.0, 1.0).await, 0.0);
    assert_eq!(add(&mut client, 0.0, 0.0).await, 0.0);
    assert_eq!(add(&mut client, 3.5, 1.25).await, 4.75);

    listener.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_calls_return_the_same_result() {
    let mut listener = start(Addition, 2).await;
    let mut client = connect(&listener).await;

    let first = add(&mut client, 0.1, 0.2).await;
    let second = add(&mut client, 0.1, 0.2).await;
    assert_eq!(first, second);
    assert_eq!(first, 0.1 + 0.2);

    listener.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn boundary_values_saturate_to_infinity() {
    let mut listener = start(Addition, 2).await;
    let mut client = connect(&listener).await;

    assert_eq!(add(&mut client, f64::MAX, f64::MAX).await, f64::INFINITY);
    assert_eq!(add(&mut client, f64::MIN, f64::MIN).await, f64::NEG_INFINITY);
    assert_eq!(add(&mut client, f64::MAX, 1.0).await, f64::MAX);
    assert!(add(&mut client, f64::INFINITY, f64::NEG_INFINITY).await.is_nan());

    listener.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_calls_are_paired_with_their_operands() {
    let mut listener = start(Addition, 4).await;
    let client = connect(&listener).await;

    let calls = (0..200).map(|i| {
        let mut client = client.clone();
        async move {
            let a = f64::from(i);
            let b = f64::from(i) * 1_000.0;
            (a + b, add(&mut client, a, b).await)
        }
    });

    for (expected, got) in join_all(calls).await {
        assert_eq!(got, expected);
    }

    listener.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn other_operators_are_unimplemented() {
    let mut listener = start(Addition, 1).await;
    let mut client = connect(&listener).await;
    let operands = || TwoNumbers { a: 8.0, b: 2.0 };

    let statuses = [
        client.subtract(operands()).await.unwrap_err(),
        client.multiply(operands()).await.unwrap_err(),
        client.divide(operands()).await.unwrap_err(),
        client.modulus(operands()).await.unwrap_err(),
        client.exponentiate(operands()).await.unwrap_err(),
    ];
    for status in statuses {
        assert_eq!(status.code(), Code::Unimplemented);
    }

    listener.stop().await.unwrap();
}

/// Sends pre-encoded bytes and decodes the answer as a `Number`.
#[derive(Default)]
struct RawCodec;

struct RawEncoder;

impl Encoder for RawEncoder {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, buf: &mut EncodeBuf<'_>) -> Result<(), Status> {
        buf.put_slice(&item);
        Ok(())
    }
}

impl Codec for RawCodec {
    type Encode = Bytes;
    type Decode = Number;
    type Encoder = RawEncoder;
    type Decoder = <ProtoCodec<Number, Number> as Codec>::Decoder;

    fn encoder(&mut self) -> Self::Encoder {
        RawEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        ProtoCodec::<Number, Number>::default().decoder()
    }
}

async fn channel(endpoint: String) -> Channel {
    Channel::from_shared(endpoint)
        .unwrap()
        .connect()
        .await
        .unwrap()
}

async fn send_raw(endpoint: String, payload: Bytes) -> Result<Number, Status> {
    let channel = channel(endpoint).await;
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.unwrap();

    grpc.unary(
        Request::new(payload),
        PathAndQuery::from_static(ADD_METHOD_PATH),
        RawCodec,
    )
    .await
    .map(tonic::Response::into_inner)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn malformed_payload_is_rejected_before_the_handler() {
    let handler = counting();
    let mut listener = start(Arc::clone(&handler), 2).await;

    // Field 1 as a 64-bit value, truncated after two bytes.
    let status = send_raw(endpoint(&listener), Bytes::from_static(&[0x09, 0x00, 0x01]))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(handler.calls(), 0);

    // A well-formed payload over the same path still works.
    let valid = Bytes::from(TwoNumbers { a: 2.0, b: 3.0 }.encode_to_vec());
    let sum = send_raw(endpoint(&listener), valid).await.unwrap();
    assert_eq!(sum.result, 5.0);
    assert_eq!(handler.calls(), 1);

    listener.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn health_reports_serving() {
    let mut listener = start(Addition, 1).await;
    let mut health = HealthClient::new(channel(endpoint(&listener)).await);

    let resp = health
        .check(HealthCheckRequest {
            service: "calculator.Calculator".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.status, ServingStatus::Serving as i32);

    listener.stop().await.unwrap();
}

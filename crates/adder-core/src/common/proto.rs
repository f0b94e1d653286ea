//! gRPC service and message definitions generated from
//! `proto/calculator.proto`.
//!
//! ## Service
//!
//! - `Calculator` - six unary binary-arithmetic methods. The adder server
//!   implements `Add` and answers `UNIMPLEMENTED` for the rest.
//!
//! ## Messages
//!
//! - [`TwoNumbers`] - the operand pair, two `double` fields `a` and `b`.
//! - [`Number`] - the `double` result.

tonic::include_proto!("calculator");

/// Encoded `FileDescriptorSet` for `calculator.proto`, registered with the
/// reflection service.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("calculator_descriptor");

/// Fully-qualified gRPC path of the `Add` method.
pub const ADD_METHOD_PATH: &str = "/calculator.Calculator/Add";

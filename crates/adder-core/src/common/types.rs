//! # Operand and result types
//!
//! The handler works on [`Operands`] and [`Sum`], not on the generated
//! protobuf messages, so business logic never depends on the wire schema.
//! Conversions to and from [`TwoNumbers`] and [`Number`] live here.
//!
//! ## Numeric representation
//!
//! Both operands and the result are IEEE-754 binary64 ([`f64`]), the same as
//! the `double` fields of the schema. Arithmetic follows IEEE rules with
//! round-to-nearest:
//!
//! - a finite sum whose magnitude exceeds [`f64::MAX`] saturates to
//!   `+inf`/`-inf`;
//! - `inf + -inf` is NaN, and NaN operands propagate;
//! - no call is rejected on numeric grounds.

use crate::common::proto::{Number, TwoNumbers};

/// Numeric type of operands and results.
pub type Value = f64;

/// The ordered operand pair of a single call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operands {
    pub a: Value,
    pub b: Value,
}

impl Operands {
    pub const fn new(a: Value, b: Value) -> Self {
        Self { a, b }
    }
}

impl From<TwoNumbers> for Operands {
    fn from(TwoNumbers { a, b }: TwoNumbers) -> Self {
        Self { a, b }
    }
}

impl From<Operands> for TwoNumbers {
    fn from(Operands { a, b }: Operands) -> Self {
        Self { a, b }
    }
}

/// The result of a single call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sum {
    pub result: Value,
}

impl Sum {
    pub const fn new(result: Value) -> Self {
        Self { result }
    }
}

impl From<Sum> for Number {
    fn from(Sum { result }: Sum) -> Self {
        Self { result }
    }
}

impl From<Number> for Sum {
    fn from(Number { result }: Number) -> Self {
        Self { result }
    }
}

//! The addition capability.
//!
//! [`Adder`] is the seam between transport and business logic. The server
//! only knows it holds "something that adds"; tests plug in their own
//! implementations without touching the gRPC layer.

use crate::common::types::{Operands, Sum};

/// A handler that answers one addition call.
///
/// Implementations must be pure and non-blocking: the server invokes them
/// from a pool of worker tasks without any synchronization.
pub trait Adder: Send + Sync + 'static {
    fn add(&self, operands: Operands) -> Sum;
}

/// The production handler: IEEE-754 binary64 addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Addition;

impl Adder for Addition {
    #[inline]
    fn add(&self, Operands { a, b }: Operands) -> Sum {
        Sum::new(a + b)
    }
}

impl<A: Adder> Adder for std::sync::Arc<A> {
    fn add(&self, operands: Operands) -> Sum {
        (**self).add(operands)
    }
}

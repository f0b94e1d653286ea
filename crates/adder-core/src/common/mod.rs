pub mod codec;
pub mod error;
pub mod handler;
pub mod proto;
pub mod types;

pub use error::{Error, Result};
pub use handler::{Adder, Addition};
pub use types::{Operands, Sum};

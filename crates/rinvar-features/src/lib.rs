#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod features;
pub use features::*;

/// Fixed channel layout of the output descriptor.
pub mod channels;

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Elementary rotation matrices and ZYZ Euler-angle composition.
pub mod rotation;

/// Cartesian to spherical coordinate conversion.
pub mod spherical;

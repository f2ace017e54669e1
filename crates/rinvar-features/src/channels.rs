//! Channel indices of the `[B, N, K, 8]` descriptor.
//!
//! The order is a public contract; consumers index by these constants.

/// Angle between the canonicalized neighbor direction and +z, divided by pi.
pub const CANONICAL_ANGLE: usize = 0;

/// Euclidean norm of the neighbor point.
pub const HEIGHT: usize = 1;

/// Length of the edge from the neighbor to the neighborhood mean.
pub const L1_NORM: usize = 2;

/// Length of the edge from the reference point to the neighbor.
pub const L2_NORM: usize = 3;

/// Length of the edge from the neighborhood mean to the reference point.
pub const L3_NORM: usize = 4;

/// Cosine of the angle between the mean-to-neighbor and neighbor-to-reference edges.
pub const THETA1: usize = 5;

/// Cosine of the angle between the neighbor-to-reference and reference-to-mean edges.
pub const THETA2: usize = 6;

/// Cosine of the angle between the reference-to-mean and mean-to-neighbor edges.
pub const THETA3: usize = 7;

/// Number of channels in one descriptor.
pub const NUM_CHANNELS: usize = 8;

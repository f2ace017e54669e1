use glam::{DMat3, DVec3};
use rayon::prelude::*;
use thiserror::Error;

use rinvar_linalg::rotation::euler_zyz_to_rotation_matrix;
use rinvar_linalg::spherical::cartesian_to_spherical;

use crate::channels::NUM_CHANNELS;

/// Guard against division by zero on degenerate (zero-length) edges.
const EDGE_EPS: f64 = 1e-7;

/// Error types for the feature extractor.
///
/// All variants are structural shape mismatches; degenerate geometry
/// (coincident points, zero-length edges) is absorbed numerically and never
/// raises an error.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    /// The batch or neighbor dimension is zero.
    #[error("batch and neighbor dimensions must be non-zero, got batch={batch}, neighbors={neighbors}")]
    EmptyAxis {
        /// Number of batches requested.
        batch: usize,
        /// Number of neighbors per query requested.
        neighbors: usize,
    },

    /// The neighbor points cannot be reshaped to `[batch, queries, neighbors, 3]`.
    #[error("points_r length {len} does not factor into {batch} batches of {neighbors}-neighbor queries")]
    NeighborShapeMismatch {
        /// Length of the neighbor point slice.
        len: usize,
        /// Number of batches requested.
        batch: usize,
        /// Number of neighbors per query requested.
        neighbors: usize,
    },

    /// The reference points cannot be reshaped to `[batch, queries, 1, 3]`.
    #[error("points_s length {len} does not factor into {batch} batches of reference points")]
    ReferenceShapeMismatch {
        /// Length of the reference point slice.
        len: usize,
        /// Number of batches requested.
        batch: usize,
    },

    /// The query dimensions differ and the neighbor side is not broadcastable.
    #[error("query dimensions do not broadcast: points_r has {r_queries} queries, points_s has {s_queries}")]
    QueryShapeMismatch {
        /// Query dimension of the neighbor points.
        r_queries: usize,
        /// Query dimension of the reference points.
        s_queries: usize,
    },
}

/// Compute rotation-invariant descriptors for local point neighborhoods.
///
/// For every query location the function builds a triangle per neighbor out
/// of the neighborhood mean, the neighbor, and the reference point, and
/// records its edge lengths and interior angle cosines. A canonicalizing
/// rotation derived from the reference point's own direction additionally
/// ties each neighbor direction to the reference orientation: every output
/// channel is unchanged when one fixed rotation is applied jointly to all
/// input points.
///
/// Note that the canonical-angle channel is built from the absolute position
/// of the reference point, so unlike the length and cosine channels it is
/// rotation-invariant but not translation-invariant.
///
/// # Arguments
///
/// * `points_r` - Neighbor points, `batch * queries_r * neighbors` entries
///   laid out row-major as `[batch, queries_r, neighbors, 3]`. A `queries_r`
///   of 1 broadcasts over the reference query dimension.
/// * `points_s` - Reference points, `batch * queries` entries laid out
///   row-major as `[batch, queries, 1, 3]`.
/// * `batch` - Number of batches.
/// * `neighbors` - Number of neighbors per query location.
///
/// # Returns
///
/// The descriptors laid out row-major as `[batch, queries, neighbors, 8]`,
/// channel order `[canonical_angle, height, l1_norm, l2_norm, l3_norm,
/// theta1, theta2, theta3]` (see [`crate::channels`]).
///
/// Example:
///
/// ```
/// use rinvar_features::rotation_invariant_features;
///
/// // one batch, one query, two neighbors
/// let points_r = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// let points_s = [[0.0, 0.0, 1.0]];
/// let features = rotation_invariant_features(&points_r, &points_s, 1, 2).unwrap();
/// assert_eq!(features.len(), 2);
/// ```
pub fn rotation_invariant_features(
    points_r: &[[f64; 3]],
    points_s: &[[f64; 3]],
    batch: usize,
    neighbors: usize,
) -> Result<Vec<[f64; NUM_CHANNELS]>, FeatureError> {
    if batch == 0 || neighbors == 0 {
        return Err(FeatureError::EmptyAxis { batch, neighbors });
    }
    if points_r.len() % (batch * neighbors) != 0 {
        return Err(FeatureError::NeighborShapeMismatch {
            len: points_r.len(),
            batch,
            neighbors,
        });
    }
    if points_s.len() % batch != 0 {
        return Err(FeatureError::ReferenceShapeMismatch {
            len: points_s.len(),
            batch,
        });
    }

    let r_queries = points_r.len() / (batch * neighbors);
    let s_queries = points_s.len() / batch;
    let broadcast = r_queries != s_queries;
    if broadcast && r_queries != 1 {
        return Err(FeatureError::QueryShapeMismatch {
            r_queries,
            s_queries,
        });
    }

    log::debug!(
        "extracting features: batch={batch} queries={s_queries} neighbors={neighbors} broadcast={broadcast}"
    );

    let mut features = vec![[0.0; NUM_CHANNELS]; batch * s_queries * neighbors];
    features
        .par_chunks_exact_mut(neighbors)
        .enumerate()
        .for_each(|(flat_query, out)| {
            let b = flat_query / s_queries;
            let n = flat_query % s_queries;
            let rq = if broadcast { 0 } else { n };
            let block = &points_r[(b * r_queries + rq) * neighbors..][..neighbors];
            let reference = DVec3::from_array(points_s[b * s_queries + n]);
            query_features(block, reference, out);
        });

    Ok(features)
}

/// Fill the descriptors of a single query location.
fn query_features(block: &[[f64; 3]], reference: DVec3, out: &mut [[f64; NUM_CHANNELS]]) {
    let mut r_mean = DVec3::ZERO;
    for point in block {
        r_mean += DVec3::from_array(*point);
    }
    r_mean /= block.len() as f64;

    // the mean-to-reference edge does not depend on the neighbor index
    let l3 = reference - r_mean;
    let l3_norm = l3.length();

    let m0 = canonicalizing_rotation(reference);

    for (point, feature) in block.iter().zip(out.iter_mut()) {
        let point = DVec3::from_array(*point);
        let l1 = r_mean - point;
        let l2 = point - reference;
        let l1_norm = l1.length();
        let l2_norm = l2.length();
        let theta1 = l1.dot(l2) / (l1_norm * l2_norm + EDGE_EPS);
        let theta2 = l2.dot(l3) / (l2_norm * l3_norm + EDGE_EPS);
        let theta3 = l3.dot(l1) / (l3_norm * l1_norm + EDGE_EPS);

        let height = point.length();
        let rotated = m0 * (point / height);
        let canonical_angle = rotated.z.clamp(-1.0, 1.0).acos() / std::f64::consts::PI;

        *feature = [
            canonical_angle,
            height,
            l1_norm,
            l2_norm,
            l3_norm,
            theta1,
            theta2,
            theta3,
        ];
    }
}

/// Build the canonicalizing rotation from the reference point's direction.
///
/// The spherical triple of the reference point is reordered (first and last
/// components swapped), negated, and ZYZ-composed. The resulting matrix sends
/// the reference direction to +z, so neighbor directions expressed through it
/// are insensitive to a global rotation of the scene.
fn canonicalizing_rotation(reference: DVec3) -> DMat3 {
    let mut sph = cartesian_to_spherical(&reference.to_array());
    sph.swap(0, 2);
    let m = euler_zyz_to_rotation_matrix(&[-sph[0], -sph[1], -sph[2]]);
    // row-major to glam column-major
    DMat3::from_cols(
        DVec3::new(m[0][0], m[1][0], m[2][0]),
        DVec3::new(m[0][1], m[1][1], m[2][1]),
        DVec3::new(m[0][2], m[1][2], m[2][2]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels;
    use approx::assert_relative_eq;
    use rinvar_linalg::rotation::mat3_vec3_mul;

    fn random_points(count: usize) -> Vec<[f64; 3]> {
        (0..count)
            .map(|_| {
                [
                    rand::random::<f64>() * 2.0 - 1.0,
                    rand::random::<f64>() * 2.0 - 1.0,
                    rand::random::<f64>() * 2.0 + 0.5,
                ]
            })
            .collect()
    }

    fn rotate_points(points: &[[f64; 3]], rotation: &[[f64; 3]; 3]) -> Vec<[f64; 3]> {
        points
            .iter()
            .map(|p| mat3_vec3_mul(rotation, p))
            .collect()
    }

    fn translate_points(points: &[[f64; 3]], offset: &[f64; 3]) -> Vec<[f64; 3]> {
        points
            .iter()
            .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
            .collect()
    }

    #[test]
    fn test_rotation_invariance() -> Result<(), FeatureError> {
        let (batch, queries, neighbors) = (2, 3, 5);
        let points_r = random_points(batch * queries * neighbors);
        let points_s = random_points(batch * queries);

        let features = rotation_invariant_features(&points_r, &points_s, batch, neighbors)?;

        for _ in 0..5 {
            let angles = [
                rand::random::<f64>() * 6.0 - 3.0,
                rand::random::<f64>() * 3.0,
                rand::random::<f64>() * 6.0 - 3.0,
            ];
            let rotation = euler_zyz_to_rotation_matrix(&angles);
            let rotated_features = rotation_invariant_features(
                &rotate_points(&points_r, &rotation),
                &rotate_points(&points_s, &rotation),
                batch,
                neighbors,
            )?;

            for (feature, rotated) in features.iter().zip(rotated_features.iter()) {
                for c in 0..channels::NUM_CHANNELS {
                    assert_relative_eq!(feature[c], rotated[c], epsilon = 1e-5);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_translation_splits_channels() -> Result<(), FeatureError> {
        let points_r = vec![[1.0, 0.2, 0.4], [0.3, 1.1, 0.6], [-0.5, 0.7, 1.3]];
        let points_s = vec![[0.2, -0.1, 1.0]];
        let offset = [5.0, -3.0, 2.0];

        let features = rotation_invariant_features(&points_r, &points_s, 1, 3)?;
        let shifted_features = rotation_invariant_features(
            &translate_points(&points_r, &offset),
            &translate_points(&points_s, &offset),
            1,
            3,
        )?;

        for (feature, shifted) in features.iter().zip(shifted_features.iter()) {
            // lengths and angle cosines do not see the shift
            for c in [
                channels::L1_NORM,
                channels::L2_NORM,
                channels::L3_NORM,
                channels::THETA1,
                channels::THETA2,
                channels::THETA3,
            ] {
                assert_relative_eq!(feature[c], shifted[c], epsilon = 1e-9);
            }
            // the height and canonical angle are anchored at the origin
            assert!((feature[channels::HEIGHT] - shifted[channels::HEIGHT]).abs() > 1e-3);
            assert!(
                (feature[channels::CANONICAL_ANGLE] - shifted[channels::CANONICAL_ANGLE]).abs()
                    > 1e-4
            );
        }
        Ok(())
    }

    #[test]
    fn test_degenerate_neighbor_at_mean() -> Result<(), FeatureError> {
        // the third neighbor coincides with the neighborhood mean
        let points_r = vec![[2.0, 0.0, 1.0], [0.0, 2.0, 1.0], [1.0, 1.0, 1.0]];
        let points_s = vec![[0.5, 0.5, 2.0]];

        let features = rotation_invariant_features(&points_r, &points_s, 1, 3)?;
        let degenerate = &features[2];

        assert_eq!(degenerate[channels::L1_NORM], 0.0);
        assert_eq!(degenerate[channels::THETA1], 0.0);
        assert_eq!(degenerate[channels::THETA3], 0.0);
        for value in degenerate.iter() {
            assert!(value.is_finite());
        }
        Ok(())
    }

    #[test]
    fn test_channel_count_and_order() -> Result<(), FeatureError> {
        let points_r = vec![[1.0, 2.0, 3.0], [3.0, 2.0, 1.0]];
        let points_s = vec![[0.5, 0.5, 0.5]];

        let features = rotation_invariant_features(&points_r, &points_s, 1, 2)?;
        assert_eq!(features.len(), 2);
        assert_eq!(channels::NUM_CHANNELS, 8);

        let feature = &features[0];
        let point = glam::DVec3::from_array(points_r[0]);
        let reference = glam::DVec3::from_array(points_s[0]);
        let mean = (glam::DVec3::from_array(points_r[0]) + glam::DVec3::from_array(points_r[1]))
            / 2.0;

        assert_relative_eq!(feature[channels::HEIGHT], point.length());
        assert_relative_eq!(feature[channels::L1_NORM], (mean - point).length());
        assert_relative_eq!(feature[channels::L2_NORM], (point - reference).length());
        assert_relative_eq!(feature[channels::L3_NORM], (reference - mean).length());
        Ok(())
    }

    #[test]
    fn test_reference_on_z_axis_scenario() -> Result<(), FeatureError> {
        let points_r = vec![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
        ];
        let points_s = vec![[0.0, 0.0, 1.0]];

        let features = rotation_invariant_features(&points_r, &points_s, 1, 4)?;
        assert_eq!(features.len(), 4);

        for feature in &features {
            assert_relative_eq!(feature[channels::HEIGHT], 1.0, epsilon = 1e-12);
            // the neighborhood mean is the origin, one unit from each neighbor
            assert_relative_eq!(feature[channels::L1_NORM], 1.0, epsilon = 1e-12);
            // every neighbor is orthogonal to the reference direction
            assert_relative_eq!(feature[channels::CANONICAL_ANGLE], 0.5, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_neighbor_query_broadcast() -> Result<(), FeatureError> {
        let (batch, queries, neighbors) = (1, 5, 3);
        let points_r = random_points(neighbors);
        let points_s = random_points(batch * queries);

        let broadcast = rotation_invariant_features(&points_r, &points_s, batch, neighbors)?;

        let mut replicated = Vec::with_capacity(queries * neighbors);
        for _ in 0..queries {
            replicated.extend_from_slice(&points_r);
        }
        let manual = rotation_invariant_features(&replicated, &points_s, batch, neighbors)?;

        assert_eq!(broadcast.len(), manual.len());
        for (lhs, rhs) in broadcast.iter().zip(manual.iter()) {
            assert_eq!(lhs, rhs);
        }
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_errors() {
        let points = vec![[0.0, 0.0, 1.0]; 6];

        assert_eq!(
            rotation_invariant_features(&points, &points[..2], 0, 3),
            Err(FeatureError::EmptyAxis {
                batch: 0,
                neighbors: 3
            })
        );
        assert_eq!(
            rotation_invariant_features(&points[..5], &points[..1], 1, 3),
            Err(FeatureError::NeighborShapeMismatch {
                len: 5,
                batch: 1,
                neighbors: 3
            })
        );
        assert_eq!(
            rotation_invariant_features(&points, &points[..3], 2, 3),
            Err(FeatureError::ReferenceShapeMismatch { len: 3, batch: 2 })
        );
        // two neighbor queries cannot broadcast onto three reference queries
        assert_eq!(
            rotation_invariant_features(&points, &points[..3], 1, 3),
            Err(FeatureError::QueryShapeMismatch {
                r_queries: 2,
                s_queries: 3
            })
        );
    }
}

/// Convert a Cartesian point to spherical coordinates.
///
/// Returns `[azimuth, polar, radius]`:
///
/// * `azimuth` - angle in the xy plane from the +x axis, `atan2(y, x)`,
///   in `(-pi, pi]`.
/// * `polar` - angle from the +z axis, `acos(z / radius)`, in `[0, pi]`.
/// * `radius` - non-negative Euclidean norm of the point.
///
/// The component order is a contract: consumers that swap the first and last
/// components and negate the triple obtain ZYZ Euler angles whose composed
/// rotation maps the input direction onto the +z axis, up to an outer
/// rotation about z.
///
/// The origin has no defined direction; it maps to `[0.0, NaN, 0.0]`, which
/// propagates numerically rather than raising an error.
///
/// Example:
///
/// ```
/// use rinvar_linalg::spherical::cartesian_to_spherical;
///
/// let sph = cartesian_to_spherical(&[0.0, 0.0, 2.0]);
/// assert_eq!(sph, [0.0, 0.0, 2.0]);
/// ```
pub fn cartesian_to_spherical(point: &[f64; 3]) -> [f64; 3] {
    let radius = (point[0] * point[0] + point[1] * point[1] + point[2] * point[2]).sqrt();
    let polar = (point[2] / radius).acos();
    let azimuth = point[1].atan2(point[0]);
    [azimuth, polar, radius]
}

/// Convert a batch of Cartesian points to spherical coordinates.
pub fn cartesian_to_spherical_batch(points: &[[f64; 3]]) -> Vec<[f64; 3]> {
    points.iter().map(cartesian_to_spherical).collect()
}

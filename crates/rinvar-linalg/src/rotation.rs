/// Compute the rotation matrix about the z axis.
///
/// ```text
/// [cos(a), -sin(a), 0]
/// [sin(a),  cos(a), 0]
/// [     0,       0, 1]
/// ```
///
/// # Arguments
///
/// * `angle` - The rotation angle in radians.
///
/// # Returns
///
/// The 3x3 rotation matrix in row-major order.
///
/// Example:
///
/// ```
/// use rinvar_linalg::rotation::rotation_around_z;
///
/// let rotation = rotation_around_z(std::f64::consts::PI / 2.0);
/// assert!((rotation[0][1] - (-1.0)).abs() < 1e-12);
/// ```
pub fn rotation_around_z(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Compute the rotation matrix about the y axis.
///
/// ```text
/// [ cos(a), 0, sin(a)]
/// [      0, 1,      0]
/// [-sin(a), 0, cos(a)]
/// ```
///
/// # Arguments
///
/// * `angle` - The rotation angle in radians.
///
/// # Returns
///
/// The 3x3 rotation matrix in row-major order.
pub fn rotation_around_y(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

/// Compute the rotation matrix about the x axis.
///
/// ```text
/// [1,      0,       0]
/// [0, cos(a), -sin(a)]
/// [0, sin(a),  cos(a)]
/// ```
///
/// # Arguments
///
/// * `angle` - The rotation angle in radians.
///
/// # Returns
///
/// The 3x3 rotation matrix in row-major order.
pub fn rotation_around_x(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Compute rotation matrices about the z axis for a batch of angles.
pub fn rotations_around_z(angles: &[f64]) -> Vec<[[f64; 3]; 3]> {
    angles.iter().map(|&a| rotation_around_z(a)).collect()
}

/// Compute rotation matrices about the y axis for a batch of angles.
pub fn rotations_around_y(angles: &[f64]) -> Vec<[[f64; 3]; 3]> {
    angles.iter().map(|&a| rotation_around_y(a)).collect()
}

/// Compute rotation matrices about the x axis for a batch of angles.
pub fn rotations_around_x(angles: &[f64]) -> Vec<[[f64; 3]; 3]> {
    angles.iter().map(|&a| rotation_around_x(a)).collect()
}

/// Multiply two 3x3 matrices in row-major order.
pub fn mat3_mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for (i, row) in a.iter().enumerate() {
        for j in 0..3 {
            m[i][j] = row[0] * b[0][j] + row[1] * b[1][j] + row[2] * b[2][j];
        }
    }
    m
}

/// Multiply a 3x3 matrix (row-major) with a 3-vector.
pub fn mat3_vec3_mul(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Compose a rotation matrix from a ZYZ Euler-angle triple.
///
/// The result is `Rz(a0) * Ry(a1) * Rz(a2)`, multiplied in that fixed order,
/// so a vector transformed by the result experiences `Rz(a2)` first.
///
/// # Arguments
///
/// * `angles` - The Euler angles `[a0, a1, a2]` in radians.
///
/// # Returns
///
/// The composed 3x3 rotation matrix in row-major order.
///
/// Non-finite angles propagate into the result as numbers; there is no error
/// condition.
///
/// Example:
///
/// ```
/// use rinvar_linalg::rotation::euler_zyz_to_rotation_matrix;
///
/// let rotation = euler_zyz_to_rotation_matrix(&[0.0, 0.0, 0.0]);
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn euler_zyz_to_rotation_matrix(angles: &[f64; 3]) -> [[f64; 3]; 3] {
    let rz0 = rotation_around_z(angles[0]);
    let ry1 = rotation_around_y(angles[1]);
    let rz2 = rotation_around_z(angles[2]);
    mat3_mul(&mat3_mul(&rz0, &ry1), &rz2)
}

/// Compose rotation matrices from a batch of ZYZ Euler-angle triples.
pub fn euler_zyz_batch(angles: &[[f64; 3]]) -> Vec<[[f64; 3]; 3]> {
    angles.iter().map(euler_zyz_to_rotation_matrix).collect()
}

use faer::Mat;

//------------------------------------------------------------------------------
// 3-vector helpers
//------------------------------------------------------------------------------

#[inline]
pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

#[inline]
pub fn add(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(v: &[f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

/// 3×3 matrix times 3-vector.
#[inline]
pub fn mat_vec3(m: &Mat<f64>, v: &[f64; 3]) -> [f64; 3] {
    [
        m[(0, 0)] * v[0] + m[(0, 1)] * v[1] + m[(0, 2)] * v[2],
        m[(1, 0)] * v[0] + m[(1, 1)] * v[1] + m[(1, 2)] * v[2],
        m[(2, 0)] * v[0] + m[(2, 1)] * v[1] + m[(2, 2)] * v[2],
    ]
}

//------------------------------------------------------------------------------
// Quaternions, (w, x, y, z) order
//------------------------------------------------------------------------------

#[inline]
pub fn quat_identity() -> [f64; 4] {
    [1., 0., 0., 0.]
}

#[inline]
pub fn quat_norm(q: &[f64; 4]) -> f64 {
    (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
}

#[inline]
pub fn quat_normalize(q: &[f64; 4]) -> [f64; 4] {
    let n = quat_norm(q);
    [q[0] / n, q[1] / n, q[2] / n, q[3] / n]
}

/// Hamilton product q1 ⊗ q2.
#[inline]
pub fn quat_product(q1: &[f64; 4], q2: &[f64; 4]) -> [f64; 4] {
    [
        q1[0] * q2[0] - q1[1] * q2[1] - q1[2] * q2[2] - q1[3] * q2[3],
        q1[0] * q2[1] + q1[1] * q2[0] + q1[2] * q2[3] - q1[3] * q2[2],
        q1[0] * q2[2] - q1[1] * q2[3] + q1[2] * q2[0] + q1[3] * q2[1],
        q1[0] * q2[3] + q1[1] * q2[2] - q1[2] * q2[1] + q1[3] * q2[0],
    ]
}

/// Rotation matrix equivalent of a unit quaternion.
pub fn quat_as_matrix(q: &[f64; 4]) -> Mat<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    let mut m = Mat::<f64>::zeros(3, 3);
    m[(0, 0)] = w * w + x * x - y * y - z * z;
    m[(0, 1)] = 2. * (x * y - w * z);
    m[(0, 2)] = 2. * (x * z + w * y);
    m[(1, 0)] = 2. * (x * y + w * z);
    m[(1, 1)] = w * w - x * x + y * y - z * z;
    m[(1, 2)] = 2. * (y * z - w * x);
    m[(2, 0)] = 2. * (x * z - w * y);
    m[(2, 1)] = 2. * (y * z + w * x);
    m[(2, 2)] = w * w - x * x - y * y + z * z;
    m
}

#[inline]
pub fn quat_rotate_vector(q: &[f64; 4], v: &[f64; 3]) -> [f64; 3] {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    [
        (w * w + x * x - y * y - z * z) * v[0]
            + 2. * (x * y - w * z) * v[1]
            + 2. * (x * z + w * y) * v[2],
        2. * (x * y + w * z) * v[0]
            + (w * w - x * x + y * y - z * z) * v[1]
            + 2. * (y * z - w * x) * v[2],
        2. * (x * z - w * y) * v[0]
            + 2. * (y * z + w * x) * v[1]
            + (w * w - x * x - y * y + z * z) * v[2],
    ]
}

/// Quaternion for the intrinsic z-y'-x'' (yaw-pitch-roll) Cardan sequence.
pub fn quat_from_euler_zyx(phi: f64, theta: f64, psi: f64) -> [f64; 4] {
    let (s1, c1) = (psi / 2.).sin_cos();
    let (s2, c2) = (theta / 2.).sin_cos();
    let (s3, c3) = (phi / 2.).sin_cos();
    [
        c1 * c2 * c3 + s1 * s2 * s3,
        c1 * c2 * s3 - s1 * s2 * c3,
        c1 * s2 * c3 + s1 * c2 * s3,
        s1 * c2 * c3 - c1 * s2 * s3,
    ]
}

/// Euler angles (phi, theta, psi) of the intrinsic z-y'-x'' Cardan sequence.
pub fn quat_to_euler_zyx(q: &[f64; 4]) -> (f64, f64, f64) {
    let q = quat_normalize(q);
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    let phi = (2. * (w * x + y * z)).atan2(1. - 2. * (x * x + y * y));
    let sin_theta = (2. * (w * y - x * z)).clamp(-1., 1.);
    let theta = sin_theta.asin();
    let psi = (2. * (w * z + x * y)).atan2(1. - 2. * (y * y + z * z));
    (phi, theta, psi)
}

//------------------------------------------------------------------------------
// Compensated summation
//------------------------------------------------------------------------------

/// Kahan sum. Thin near-waterline facets make naive immersion averages
/// numerically sensitive.
pub fn kahan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.;
    let mut c = 0.;
    for v in values {
        let y = v - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

//------------------------------------------------------------------------------
// Small dense inverses
//------------------------------------------------------------------------------

/// Gauss-Jordan inverse with partial pivoting for small dense matrices.
/// Returns (inverse, determinant); the determinant is still meaningful when
/// the matrix is near singular.
pub fn invert(m: &Mat<f64>) -> (Option<Mat<f64>>, f64) {
    let n = m.nrows();
    assert_eq!(n, m.ncols());
    let mut a = m.clone();
    let mut inv = Mat::<f64>::identity(n, n);
    let mut det = 1.;
    for col in 0..n {
        let mut pivot_row = col;
        for row in col + 1..n {
            if a[(row, col)].abs() > a[(pivot_row, col)].abs() {
                pivot_row = row;
            }
        }
        let pivot = a[(pivot_row, col)];
        if pivot == 0. {
            return (None, 0.);
        }
        if pivot_row != col {
            for j in 0..n {
                let tmp = a[(col, j)];
                a[(col, j)] = a[(pivot_row, j)];
                a[(pivot_row, j)] = tmp;
                let tmp = inv[(col, j)];
                inv[(col, j)] = inv[(pivot_row, j)];
                inv[(pivot_row, j)] = tmp;
            }
            det = -det;
        }
        det *= pivot;
        for j in 0..n {
            a[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[(row, col)];
            if factor == 0. {
                continue;
            }
            for j in 0..n {
                a[(row, j)] -= factor * a[(col, j)];
                inv[(row, j)] -= factor * inv[(col, j)];
            }
        }
    }
    (Some(inv), det)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn cross_product_of_basis_vectors() {
        assert_eq!(cross(&[1., 0., 0.], &[0., 1., 0.]), [0., 0., 1.]);
        assert_eq!(cross(&[0., 1., 0.], &[0., 0., 1.]), [1., 0., 0.]);
    }

    #[test]
    fn quat_matrix_matches_rotation_of_vector() {
        let q = quat_from_euler_zyx(0.3, -0.2, 1.1);
        let r = quat_as_matrix(&q);
        let v = [0.4, -1.2, 2.5];
        let rv = quat_rotate_vector(&q, &v);
        for i in 0..3 {
            let mi = r[(i, 0)] * v[0] + r[(i, 1)] * v[1] + r[(i, 2)] * v[2];
            assert_relative_eq!(mi, rv[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn euler_round_trip() {
        let (phi, theta, psi) = (0.1, -0.4, 2.0);
        let q = quat_from_euler_zyx(phi, theta, psi);
        let (phi2, theta2, psi2) = quat_to_euler_zyx(&q);
        assert_relative_eq!(phi, phi2, epsilon = 1e-12);
        assert_relative_eq!(theta, theta2, epsilon = 1e-12);
        assert_relative_eq!(psi, psi2, epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_about_z() {
        let q = quat_from_euler_zyx(0., 0., PI / 2.);
        let v = quat_rotate_vector(&q, &[1., 0., 0.]);
        assert_relative_eq!(v[0], 0., epsilon = 1e-12);
        assert_relative_eq!(v[1], 1., epsilon = 1e-12);
    }

    #[test]
    fn kahan_recovers_small_terms() {
        let values = std::iter::once(1e16)
            .chain(std::iter::repeat(1.).take(1000))
            .chain(std::iter::once(-1e16));
        assert_eq!(kahan_sum(values), 1000.);
    }

    #[test]
    fn inverse_of_diagonal() {
        let mut m = Mat::<f64>::zeros(6, 6);
        for i in 0..6 {
            m[(i, i)] = (i + 1) as f64;
        }
        let (inv, det) = invert(&m);
        assert_relative_eq!(det, 720., epsilon = 1e-9);
        let inv = inv.unwrap();
        for i in 0..6 {
            assert_relative_eq!(inv[(i, i)], 1. / ((i + 1) as f64), epsilon = 1e-12);
        }
    }

    #[test]
    fn singular_matrix_has_zero_determinant() {
        let m = Mat::<f64>::zeros(6, 6);
        let (inv, det) = invert(&m);
        assert!(inv.is_none());
        assert_eq!(det, 0.);
    }
}

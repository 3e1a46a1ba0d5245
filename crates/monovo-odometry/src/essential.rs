use nalgebra::Matrix3;

/// Essential matrix `E = Kᵗ · F · K` for a single camera with intrinsics `K`.
pub fn essential_from_fundamental(f: &Matrix3<f64>, k: &Matrix3<f64>) -> Matrix3<f64> {
    k.transpose() * f * k
}

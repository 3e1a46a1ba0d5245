use nalgebra::{Matrix3, Rotation3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noise-free correspondences between two calibrated views of a random scene.
pub(crate) struct TwoViewScene {
    pub old: Vec<Vector3<f64>>,
    pub new: Vec<Vector3<f64>>,
    pub fundamental: Matrix3<f64>,
}

impl TwoViewScene {
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let rotation = Rotation3::from_euler_angles(0.02, -0.05, 0.01).into_inner();
        let translation = Vector3::new(0.5, 0.1, 0.2);

        let mut old = Vec::with_capacity(n);
        let mut new = Vec::with_capacity(n);
        for _ in 0..n {
            let x = Vector3::new(
                rng.random_range(-2.0..2.0),
                rng.random_range(-2.0..2.0),
                rng.random_range(4.0..10.0),
            );
            let x2 = rotation * x + translation;
            old.push(x / x.z);
            new.push(x2 / x2.z);
        }

        Self {
            old,
            new,
            fundamental: translation.cross_matrix() * rotation,
        }
    }
}

/// Scale to unit Frobenius norm.
pub(crate) fn unit_frobenius(f: &Matrix3<f64>) -> Matrix3<f64> {
    f / f.norm()
}

/// Frobenius distance between two matrices defined up to scale and sign.
pub(crate) fn projective_distance(a: &Matrix3<f64>, b: &Matrix3<f64>) -> f64 {
    let a = unit_frobenius(a);
    let b = unit_frobenius(b);
    (a - b).norm().min((a + b).norm())
}

use crate::error::EpipolarError;
use nalgebra::{Matrix3, Vector2, Vector3};

/// Isotropic scaling of pixel coordinates into a well-conditioned range.
///
/// Pixel coordinates are divided by a single factor `M`, usually the larger
/// image dimension, so that the entries of the eight-point design matrix stay
/// close to unity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateScale {
    factor: f64,
}

impl CoordinateScale {
    /// Create a scale from the factor `M`.
    ///
    /// Returns [`EpipolarError::InvalidScale`] unless `m` is finite and positive.
    pub fn new(m: f64) -> Result<Self, EpipolarError> {
        if !m.is_finite() || m <= 0.0 {
            return Err(EpipolarError::InvalidScale(m));
        }
        Ok(Self { factor: m })
    }

    /// Create a scale from the image size, using the larger dimension.
    pub fn from_image_size(width: u32, height: u32) -> Result<Self, EpipolarError> {
        Self::new(width.max(height) as f64)
    }

    /// The scaling factor `M`.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Divide pixel coordinates by `M`.
    pub fn normalize(&self, points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
        points.iter().map(|p| p / self.factor).collect()
    }

    /// Multiply normalized coordinates by `M`.
    pub fn denormalize(&self, points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
        points.iter().map(|p| p * self.factor).collect()
    }

    /// The homogeneous scaling transform `T = diag(1/M, 1/M, 1)`.
    pub fn transform(&self) -> Matrix3<f64> {
        let s = 1.0 / self.factor;
        Matrix3::from_diagonal(&Vector3::new(s, s, 1.0))
    }

    /// Map a fundamental matrix estimated in normalized coordinates back to pixels.
    ///
    /// F is bilinear in homogeneous points, so the transform is applied on
    /// both sides: `F_px = Tᵗ · F · T`.
    pub fn denormalize_fundamental(&self, f: &Matrix3<f64>) -> Matrix3<f64> {
        let t = self.transform();
        t.transpose() * f * t
    }

    /// Inverse of [`CoordinateScale::denormalize_fundamental`]: `T⁻ᵗ · F · T⁻¹`.
    pub fn normalize_fundamental(&self, f: &Matrix3<f64>) -> Matrix3<f64> {
        let t_inv = Matrix3::from_diagonal(&Vector3::new(self.factor, self.factor, 1.0));
        t_inv.transpose() * f * t_inv
    }
}

/// Lift Cartesian points to homogeneous 3-vectors with a trailing 1.
pub fn to_homogeneous(points: &[Vector2<f64>]) -> Vec<Vector3<f64>> {
    points.iter().map(|p| Vector3::new(p.x, p.y, 1.0)).collect()
}

/// Drop the last homogeneous coordinate.
///
/// The last coordinate is assumed to be exactly 1 and is not divided out.
pub fn from_homogeneous(points: &[Vector3<f64>]) -> Vec<Vector2<f64>> {
    points.iter().map(|p| Vector2::new(p.x, p.y)).collect()
}

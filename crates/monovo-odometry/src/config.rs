use crate::error::OdometryError;
use monovo_epipolar::{CoordinateScale, EpipolarError, RansacConfig};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the visual odometry pipeline.
///
/// Missing fields fall back to the defaults when loading from JSON. The
/// defaults describe the left grayscale camera of the KITTI odometry
/// sequences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdometryConfig {
    /// Camera intrinsics, row major.
    pub intrinsics: [[f64; 3]; 3],
    /// Image size as `[width, height]` in pixels.
    pub image_size: [u32; 2],
    /// Frame-to-frame scale at or below which a motion is not accumulated.
    pub min_absolute_scale: f64,
    /// Tracked feature count under which features should be re-detected.
    pub min_tracked_features: usize,
    /// Robust fundamental matrix estimation parameters.
    pub ransac: RansacConfig,
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            intrinsics: [
                [721.5377, 0.0, 609.5593],
                [0.0, 721.5377, 172.854],
                [0.0, 0.0, 1.0],
            ],
            image_size: [1226, 370],
            min_absolute_scale: 0.1,
            min_tracked_features: 2000,
            ransac: RansacConfig::default(),
        }
    }
}

impl OdometryConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, OdometryError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OdometryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the configuration can drive the pipeline.
    pub fn validate(&self) -> Result<(), OdometryError> {
        self.ransac.validate()?;
        if !self.min_absolute_scale.is_finite() || self.min_absolute_scale < 0.0 {
            return Err(OdometryError::InvalidConfig(format!(
                "min_absolute_scale must be finite and non-negative, got {}",
                self.min_absolute_scale
            )));
        }
        if self.intrinsics_matrix().try_inverse().is_none() {
            return Err(OdometryError::InvalidConfig(
                "intrinsics matrix is singular".to_string(),
            ));
        }
        self.coordinate_scale()?;
        Ok(())
    }

    /// The intrinsics as a matrix `K`.
    pub fn intrinsics_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|r, c| self.intrinsics[r][c])
    }

    /// Pixel scaling by the larger image dimension.
    pub fn coordinate_scale(&self) -> Result<CoordinateScale, EpipolarError> {
        CoordinateScale::from_image_size(self.image_size[0], self.image_size[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monovo_epipolar::SelectionMode;
    use std::io::Write;

    #[test]
    fn test_default_config() -> Result<(), OdometryError> {
        let config = OdometryConfig::default();
        config.validate()?;
        assert_eq!(config.min_tracked_features, 2000);
        assert_eq!(config.min_absolute_scale, 0.1);
        assert_eq!(config.coordinate_scale()?.factor(), 1226.0);

        let k = config.intrinsics_matrix();
        assert_eq!(k[(0, 0)], 721.5377);
        assert_eq!(k[(0, 2)], 609.5593);
        assert_eq!(k[(1, 2)], 172.854);
        assert_eq!(k[(2, 2)], 1.0);
        Ok(())
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), OdometryError> {
        let config = OdometryConfig::from_json_str(
            r#"{
                "image_size": [640, 480],
                "ransac": { "iterations": 200, "selection": "min_error", "random_seed": 3 }
            }"#,
        )?;
        assert_eq!(config.image_size, [640, 480]);
        assert_eq!(config.coordinate_scale()?.factor(), 640.0);
        assert_eq!(config.ransac.iterations, 200);
        assert_eq!(config.ransac.selection, SelectionMode::MinError);
        assert_eq!(config.ransac.random_seed, Some(3));
        assert_eq!(config.ransac.sample_size, 25);
        assert_eq!(config.intrinsics, OdometryConfig::default().intrinsics);
        Ok(())
    }

    #[test]
    fn test_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "min_tracked_features": 500 }}"#)?;
        let config = OdometryConfig::from_json_file(file.path())?;
        assert_eq!(config.min_tracked_features, 500);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let res = OdometryConfig::from_json_file("/nonexistent/monovo/config.json");
        assert!(matches!(res, Err(OdometryError::IoError(_))));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            OdometryConfig::from_json_str("{ not json"),
            Err(OdometryError::ParseError(_))
        ));
        assert!(matches!(
            OdometryConfig::from_json_str(r#"{ "ransac": { "sample_size": 4 } }"#),
            Err(OdometryError::Epipolar(EpipolarError::InvalidConfig(_)))
        ));
        assert!(matches!(
            OdometryConfig::from_json_str(r#"{ "image_size": [0, 0] }"#),
            Err(OdometryError::Epipolar(EpipolarError::InvalidScale(_)))
        ));
        assert!(matches!(
            OdometryConfig::from_json_str(r#"{ "min_absolute_scale": -1.0 }"#),
            Err(OdometryError::InvalidConfig(_))
        ));
        assert!(matches!(
            OdometryConfig::from_json_str(
                r#"{ "intrinsics": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]] }"#
            ),
            Err(OdometryError::InvalidConfig(_))
        ));
    }
}

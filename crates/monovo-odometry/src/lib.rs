#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Odometry configuration and camera parameters.
pub mod config;

/// Error types for the odometry pipeline.
pub mod error;

/// Essential matrix from a fundamental matrix and intrinsics.
pub mod essential;

/// Frame-to-frame pose accumulation.
pub mod odometry;

/// Absolute scale sources.
pub mod scale;

/// Estimated camera path.
pub mod trajectory;

pub use config::OdometryConfig;
pub use error::OdometryError;
pub use essential::essential_from_fundamental;
pub use odometry::{FrameUpdate, PoseRecovery, RelativePose, VisualOdometry};
pub use scale::{GroundTruthScale, ScaleSource};
pub use trajectory::Trajectory;

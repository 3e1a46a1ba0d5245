#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the epipolar estimators.
pub mod error;

/// Pixel coordinate scaling and homogeneous conversions.
pub mod normalize;

/// Linear eight-point fundamental matrix solver.
pub mod eight_point;

/// Epipolar error and inlier scoring.
pub mod evaluate;

/// RANSAC driver over the eight-point solver.
pub mod ransac;

#[cfg(test)]
mod test_utils;

pub use eight_point::{enforce_rank2, fundamental_8point, RankProjection, MIN_CORRESPONDENCES};
pub use error::EpipolarError;
pub use evaluate::{epipolar_error, evaluate, InlierPartition, ModelScore, SelectionMode};
pub use normalize::{from_homogeneous, to_homogeneous, CoordinateScale};
pub use ransac::{find_fundamental_matrix, ransac_fundamental, FundamentalEstimate, RansacConfig};

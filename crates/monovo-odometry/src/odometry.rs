use crate::config::OdometryConfig;
use crate::error::OdometryError;
use crate::essential::essential_from_fundamental;
use crate::scale::ScaleSource;
use crate::trajectory::Trajectory;
use monovo_epipolar::{find_fundamental_matrix, CoordinateScale, EpipolarError};
use nalgebra::{Matrix3, Vector2, Vector3};

/// Relative motion between two frames, up to scale.
///
/// Maps points from the previous camera frame to the current one.
#[derive(Clone, Debug, PartialEq)]
pub struct RelativePose {
    /// Rotation matrix.
    pub rotation: Matrix3<f64>,
    /// Translation direction.
    pub translation: Vector3<f64>,
}

impl RelativePose {
    /// Whether the translation is dominated by its z (forward) component.
    pub fn is_forward_dominant(&self) -> bool {
        let t = &self.translation;
        t.z.abs() > t.x.abs() && t.z.abs() > t.y.abs()
    }
}

/// Decomposition of an essential matrix into a relative pose.
///
/// Implementations pick the physically valid solution (points in front of
/// both cameras) using the inlier correspondences.
pub trait PoseRecovery {
    /// Recover the relative pose from `essential` and its pixel inliers.
    fn recover_pose(
        &mut self,
        essential: &Matrix3<f64>,
        old_inliers: &[Vector2<f64>],
        new_inliers: &[Vector2<f64>],
    ) -> Result<RelativePose, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> PoseRecovery for F
where
    F: FnMut(
        &Matrix3<f64>,
        &[Vector2<f64>],
        &[Vector2<f64>],
    ) -> Result<RelativePose, Box<dyn std::error::Error + Send + Sync>>,
{
    fn recover_pose(
        &mut self,
        essential: &Matrix3<f64>,
        old_inliers: &[Vector2<f64>],
        new_inliers: &[Vector2<f64>],
    ) -> Result<RelativePose, Box<dyn std::error::Error + Send + Sync>> {
        self(essential, old_inliers, new_inliers)
    }
}

/// Outcome of processing one pair of frames.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameUpdate {
    /// The first usable pair set the pose directly.
    Initialized,
    /// The relative motion was accumulated with the given scale.
    Accepted {
        /// Absolute scale applied to the relative translation.
        scale: f64,
    },
    /// A pose was recovered but the motion was not accumulated.
    Rejected,
    /// No model could be estimated for this pair.
    Skipped,
}

/// Monocular visual odometry over frame-to-frame correspondences.
pub struct VisualOdometry<P, S> {
    config: OdometryConfig,
    intrinsics: Matrix3<f64>,
    scale: CoordinateScale,
    pose_recovery: P,
    scale_source: S,
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
    initialized: bool,
    frames_processed: usize,
    tracked_features: usize,
    trajectory: Trajectory,
}

impl<P: PoseRecovery, S: ScaleSource> VisualOdometry<P, S> {
    /// Create the pipeline from a validated configuration and its collaborators.
    pub fn new(
        config: OdometryConfig,
        pose_recovery: P,
        scale_source: S,
    ) -> Result<Self, OdometryError> {
        config.validate()?;
        let scale = config.coordinate_scale()?;
        Ok(Self {
            intrinsics: config.intrinsics_matrix(),
            config,
            scale,
            pose_recovery,
            scale_source,
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            initialized: false,
            frames_processed: 0,
            tracked_features: 0,
            trajectory: Trajectory::new(),
        })
    }

    /// Process the tracked pixel correspondences between two consecutive frames.
    ///
    /// Pair `k` relates frame `k` to frame `k + 1`. Pairs that do not yield a
    /// fundamental matrix are skipped and leave the pose untouched.
    ///
    /// Every call consumes a frame, including calls that return an error: the
    /// frame counter and the tracked feature count advance before estimation,
    /// so scale lookups stay aligned with the image sequence after a failure.
    pub fn process_pair(
        &mut self,
        old: &[Vector2<f64>],
        new: &[Vector2<f64>],
    ) -> Result<FrameUpdate, OdometryError> {
        self.frames_processed += 1;
        let current_frame = self.frames_processed;
        self.tracked_features = new.len();

        let estimate = match find_fundamental_matrix(old, new, &self.scale, &self.config.ransac) {
            Ok(estimate) => estimate,
            Err(
                err @ (EpipolarError::InsufficientCorrespondences { .. }
                | EpipolarError::NoViableModel { .. }),
            ) => {
                log::warn!("frame {current_frame}: skipping pair, {err}");
                return Ok(FrameUpdate::Skipped);
            }
            Err(err) => return Err(err.into()),
        };
        log::debug!(
            "frame {current_frame}: {} / {} inliers",
            estimate.inlier_count(),
            old.len()
        );

        let essential = essential_from_fundamental(&estimate.fundamental, &self.intrinsics);
        let relative = self
            .pose_recovery
            .recover_pose(&essential, &estimate.old_inliers, &estimate.new_inliers)
            .map_err(OdometryError::PoseRecovery)?;

        if !self.initialized {
            self.rotation = relative.rotation;
            self.translation = relative.translation;
            self.initialized = true;
            let position = self.position();
            self.trajectory.push(position);
            return Ok(FrameUpdate::Initialized);
        }

        let scale = self
            .scale_source
            .absolute_scale(current_frame - 1, current_frame);
        match scale {
            Some(s) if s > self.config.min_absolute_scale && relative.is_forward_dominant() => {
                self.translation += s * (self.rotation * relative.translation);
                self.rotation = relative.rotation * self.rotation;
                let position = self.position();
                self.trajectory.push(position);
                Ok(FrameUpdate::Accepted { scale: s })
            }
            _ => {
                log::debug!("frame {current_frame}: motion rejected (scale {scale:?})");
                Ok(FrameUpdate::Rejected)
            }
        }
    }

    /// Accumulated rotation.
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Accumulated translation.
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Camera position in the ground truth axes, `-t`.
    pub fn position(&self) -> Vector3<f64> {
        -self.translation
    }

    /// Positions recorded after each pose update.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Number of pairs passed to [`VisualOdometry::process_pair`].
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    /// Whether the caller should detect new features before the next pair.
    pub fn needs_redetection(&self) -> bool {
        self.tracked_features < self.config.min_tracked_features
    }

    /// The configuration driving the pipeline.
    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }
}

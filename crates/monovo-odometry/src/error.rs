use monovo_epipolar::EpipolarError;

/// Errors returned by the odometry pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OdometryError {
    /// Error reading the configuration file
    #[error("error reading configuration file")]
    IoError(#[from] std::io::Error),

    /// The configuration is not valid JSON or has the wrong shape.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid odometry configuration: {0}")]
    InvalidConfig(String),

    /// Robust fundamental matrix estimation failed.
    #[error("Fundamental estimation error: {0}")]
    Epipolar(#[from] EpipolarError),

    /// The pose recovery collaborator reported an error.
    #[error("Pose recovery failed: {0}")]
    PoseRecovery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by the fundamental matrix estimators.
#[derive(thiserror::Error, Debug)]
pub enum EpipolarError {
    /// Not enough correspondences to constrain a fundamental matrix.
    #[error("Need at least {required} correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences required.
        required: usize,
        /// Number of correspondences provided.
        actual: usize,
    },

    /// The old and new point sequences are not index aligned.
    #[error("Mismatched correspondence lengths: old ({old}) != new ({new})")]
    MismatchedLengths {
        /// Length of the old frame sequence.
        old: usize,
        /// Length of the new frame sequence.
        new: usize,
    },

    /// No RANSAC trial produced a model above the unusable sentinel.
    #[error("No viable fundamental matrix found after {iterations} iterations")]
    NoViableModel {
        /// Number of trials that were run.
        iterations: usize,
    },

    /// Singular value decomposition did not converge or produced non-finite values.
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),

    /// The coordinate scaling factor is not a finite positive number.
    #[error("Invalid coordinate scale {0}, expected a finite positive value")]
    InvalidScale(f64),

    /// The RANSAC configuration is not usable.
    #[error("Invalid RANSAC configuration: {0}")]
    InvalidConfig(String),
}

pub(crate) fn check_lengths<P>(old: &[P], new: &[P]) -> Result<(), EpipolarError> {
    if old.len() != new.len() {
        return Err(EpipolarError::MismatchedLengths {
            old: old.len(),
            new: new.len(),
        });
    }
    Ok(())
}

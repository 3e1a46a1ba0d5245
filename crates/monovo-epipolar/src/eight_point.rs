use crate::error::{check_lengths, EpipolarError};
use nalgebra::{DMatrix, Matrix3, Vector3, SVD};
use serde::{Deserialize, Serialize};

/// Minimum number of correspondences for the linear eight-point solve.
pub const MIN_CORRESPONDENCES: usize = 8;

const SVD_EPS: f64 = f64::EPSILON;
const SVD_MAX_ITERATIONS: usize = 1_000;

/// How the rank-2 constraint is imposed on the linear estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankProjection {
    /// Zero the smallest singular value and keep the other two (`U·diag(σ1,σ2,0)·Vᵗ`).
    #[default]
    ZeroSmallest,
    /// Replace the singular values by `(1, 1, 0)` (`U·diag(1,1,0)·Vᵗ`).
    ///
    /// Only exact for essential-like matrices, whose two non-zero singular
    /// values are equal (calibrated coordinates). On pixel or scaled pixel
    /// coordinates `σ1 ≠ σ2` and the projected model no longer fits its own
    /// sample.
    UnitSingularValues,
}

/// Estimate the fundamental matrix with the (unnormalized) eight-point algorithm.
///
/// - `old`: homogeneous points in the previous frame (length >= 8)
/// - `new`: corresponding homogeneous points in the current frame (same length)
///
/// The result satisfies `newᵗ · F · old ≈ 0` and has rank 2. Degenerate
/// inputs (collinear or repeated points) still produce a matrix; it is up to
/// the caller to score it.
pub fn fundamental_8point(
    old: &[Vector3<f64>],
    new: &[Vector3<f64>],
    projection: RankProjection,
) -> Result<Matrix3<f64>, EpipolarError> {
    check_lengths(old, new)?;
    if old.len() < MIN_CORRESPONDENCES {
        return Err(EpipolarError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: old.len(),
        });
    }
    solve_fundamental(old, new, projection)
}

/// Linear solve without the minimum-size check, used for RANSAC samples that
/// lost points to deduplication.
pub(crate) fn solve_fundamental(
    old: &[Vector3<f64>],
    new: &[Vector3<f64>],
    projection: RankProjection,
) -> Result<Matrix3<f64>, EpipolarError> {
    let f = solve_linear(old, new)?;
    enforce_rank2(&f, projection)
}

/// Build the design matrix `A` whose rows are `new_i ⊗ old_i`.
///
/// Fewer than 9 rows are zero-padded so the SVD always yields all 9 right
/// singular vectors.
fn design_matrix(old: &[Vector3<f64>], new: &[Vector3<f64>]) -> DMatrix<f64> {
    let rows = old.len().max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (o, n)) in old.iter().zip(new.iter()).enumerate() {
        for r in 0..3 {
            for c in 0..3 {
                a[(i, 3 * r + c)] = n[r] * o[c];
            }
        }
    }
    a
}

/// Solve `A f = 0` in the least-squares sense subject to `‖f‖ = 1`.
fn solve_linear(old: &[Vector3<f64>], new: &[Vector3<f64>]) -> Result<Matrix3<f64>, EpipolarError> {
    let finite = |p: &Vector3<f64>| p.iter().all(|v| v.is_finite());
    if !old.iter().all(finite) || !new.iter().all(finite) {
        return Err(EpipolarError::SvdFailed(
            "non-finite input coordinates".to_string(),
        ));
    }
    let a = design_matrix(old, new);
    let svd = SVD::try_new(a, false, true, SVD_EPS, SVD_MAX_ITERATIONS)
        .ok_or_else(|| EpipolarError::SvdFailed("design matrix SVD did not converge".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| EpipolarError::SvdFailed("Failed to compute V^T".to_string()))?;

    // right singular vector of the smallest singular value
    let smallest = svd.singular_values.imin();
    let f = v_t.row(smallest);
    let f = Matrix3::new(f[0], f[1], f[2], f[3], f[4], f[5], f[6], f[7], f[8]);
    if !f.iter().all(|v| v.is_finite()) {
        return Err(EpipolarError::SvdFailed(
            "non-finite fundamental matrix".to_string(),
        ));
    }
    Ok(f)
}

/// Project a 3×3 matrix onto the rank-2 matrices.
pub fn enforce_rank2(
    f: &Matrix3<f64>,
    projection: RankProjection,
) -> Result<Matrix3<f64>, EpipolarError> {
    let svd = SVD::try_new(*f, true, true, SVD_EPS, SVD_MAX_ITERATIONS)
        .ok_or_else(|| EpipolarError::SvdFailed("rank-2 SVD did not converge".to_string()))?;
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(EpipolarError::SvdFailed("Failed to compute U or V^T".to_string())),
    };

    let smallest = svd.singular_values.imin();
    let mut s = match projection {
        RankProjection::ZeroSmallest => svd.singular_values,
        RankProjection::UnitSingularValues => Vector3::repeat(1.0),
    };
    s[smallest] = 0.0;

    let f_rank2 = u * Matrix3::from_diagonal(&s) * v_t;
    if !f_rank2.iter().all(|v| v.is_finite()) {
        return Err(EpipolarError::SvdFailed(
            "non-finite rank-2 projection".to_string(),
        ));
    }
    Ok(f_rank2)
}

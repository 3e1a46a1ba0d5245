use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Policy used to compare two candidate models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// More inliers is better.
    #[default]
    MaxInliers,
    /// Lower mean inlier error is better.
    MinError,
}

/// Score of a candidate model under a [`SelectionMode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelScore {
    /// Number of inliers.
    InlierCount(usize),
    /// Mean epipolar error over the inliers.
    MeanError(f64),
}

impl ModelScore {
    /// The sentinel assigned to models with too few inliers.
    ///
    /// Zero inliers for [`SelectionMode::MaxInliers`], infinite error for
    /// [`SelectionMode::MinError`].
    pub fn unusable(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::MaxInliers => ModelScore::InlierCount(0),
            SelectionMode::MinError => ModelScore::MeanError(f64::INFINITY),
        }
    }

    /// Whether `self` is strictly better than `other`.
    ///
    /// Scores of different kinds never improve on each other.
    pub fn improves_on(&self, other: &ModelScore) -> bool {
        match (self, other) {
            (ModelScore::InlierCount(a), ModelScore::InlierCount(b)) => a > b,
            (ModelScore::MeanError(a), ModelScore::MeanError(b)) => a < b,
            _ => false,
        }
    }
}

/// Split of a correspondence set into inliers and outliers for one model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlierPartition {
    /// Per-correspondence inlier flag, index aligned with the input.
    pub mask: Vec<bool>,
    /// Number of inliers.
    pub inlier_count: usize,
    total_error: f64,
    viable: bool,
}

impl InlierPartition {
    /// Sum of the epipolar errors of the inliers.
    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    /// Mean epipolar error of the inliers, infinite when there are none.
    pub fn mean_error(&self) -> f64 {
        if self.inlier_count == 0 {
            return f64::INFINITY;
        }
        self.total_error / self.inlier_count as f64
    }

    /// Whether the inlier count reached the minimum viable size.
    pub fn is_viable(&self) -> bool {
        self.viable
    }

    /// Score used for model comparison, or the unusable sentinel.
    pub fn score(&self, mode: SelectionMode) -> ModelScore {
        if !self.viable {
            return ModelScore::unusable(mode);
        }
        match mode {
            SelectionMode::MaxInliers => ModelScore::InlierCount(self.inlier_count),
            SelectionMode::MinError => ModelScore::MeanError(self.mean_error()),
        }
    }

    /// Gather the inlier correspondences, keeping their original order.
    pub fn split<P: Clone>(&self, old: &[P], new: &[P]) -> (Vec<P>, Vec<P>) {
        let mut old_inliers = Vec::with_capacity(self.inlier_count);
        let mut new_inliers = Vec::with_capacity(self.inlier_count);
        for ((keep, o), n) in self.mask.iter().zip(old).zip(new) {
            if *keep {
                old_inliers.push(o.clone());
                new_inliers.push(n.clone());
            }
        }
        (old_inliers, new_inliers)
    }
}

/// Symmetric epipolar error of one correspondence.
///
/// `(newᵗ·F·old)² / ((F·old)₀² + (F·old)₁² + (Fᵗ·new)₀² + (Fᵗ·new)₁²)`.
/// A zero or non-finite denominator yields `f64::INFINITY`.
pub fn epipolar_error(f: &Matrix3<f64>, old: &Vector3<f64>, new: &Vector3<f64>) -> f64 {
    let line1 = f * old;
    let line2 = f.tr_mul(new);
    let residual = new.dot(&line1);
    let numerator = residual * residual;
    let denominator =
        line1.x * line1.x + line1.y * line1.y + line2.x * line2.x + line2.y * line2.y;
    let error = numerator / denominator;
    if error.is_finite() {
        error
    } else {
        f64::INFINITY
    }
}

/// Score a fundamental matrix against a full correspondence set.
///
/// A correspondence is an inlier iff its [`epipolar_error`] is below
/// `threshold`. The partition is viable when it holds at least
/// `min_inliers` (and at least one) inliers.
pub fn evaluate(
    old: &[Vector3<f64>],
    new: &[Vector3<f64>],
    f: &Matrix3<f64>,
    threshold: f64,
    min_inliers: usize,
) -> InlierPartition {
    let mut mask = vec![false; old.len().min(new.len())];
    let mut inlier_count = 0usize;
    let mut total_error = 0.0f64;
    for (i, (o, n)) in old.iter().zip(new.iter()).enumerate() {
        let error = epipolar_error(f, o, n);
        if error < threshold {
            mask[i] = true;
            inlier_count += 1;
            total_error += error;
        }
    }

    InlierPartition {
        mask,
        inlier_count,
        total_error,
        viable: inlier_count >= min_inliers.max(1),
    }
}

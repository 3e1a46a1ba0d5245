use crate::eight_point::{solve_fundamental, RankProjection, MIN_CORRESPONDENCES};
use crate::error::{check_lengths, EpipolarError};
use crate::evaluate::{evaluate, InlierPartition, ModelScore, SelectionMode};
use crate::normalize::{to_homogeneous, CoordinateScale};
use nalgebra::{Matrix3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for RANSAC fundamental matrix estimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Fixed number of trials. There is no early exit.
    pub iterations: usize,
    /// Indices drawn with replacement per trial, before deduplication.
    ///
    /// Must exceed the eight-point minimum so that duplicates and noisy
    /// correspondences leave the linear system overdetermined.
    pub sample_size: usize,
    /// Epipolar error below which a correspondence is an inlier.
    pub threshold: f64,
    /// Inlier count under which a model is scored as unusable.
    pub min_inliers: usize,
    /// How candidate models are compared.
    pub selection: SelectionMode,
    /// Rank-2 projection applied to every fitted model.
    pub rank_projection: RankProjection,
    /// Optional RNG seed for deterministic runs.
    pub random_seed: Option<u64>,
    /// Evaluate trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            iterations: 25,
            sample_size: 25,
            threshold: 0.1,
            min_inliers: 10,
            selection: SelectionMode::MaxInliers,
            rank_projection: RankProjection::ZeroSmallest,
            random_seed: None,
            parallel: false,
        }
    }
}

impl RansacConfig {
    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), EpipolarError> {
        if self.iterations == 0 {
            return Err(EpipolarError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.sample_size <= MIN_CORRESPONDENCES {
            return Err(EpipolarError::InvalidConfig(format!(
                "sample_size must be greater than {MIN_CORRESPONDENCES}, got {}",
                self.sample_size
            )));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(EpipolarError::InvalidConfig(format!(
                "threshold must be finite and positive, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Result of a robust fundamental matrix fit.
#[derive(Clone, Debug)]
pub struct FundamentalEstimate<P> {
    /// Best fundamental matrix, `newᵗ · F · old ≈ 0`.
    pub fundamental: Matrix3<f64>,
    /// Per-correspondence inlier mask, index aligned with the input.
    pub inlier_mask: Vec<bool>,
    /// Inliers of the old frame, in input order.
    pub old_inliers: Vec<P>,
    /// Inliers of the new frame, in input order.
    pub new_inliers: Vec<P>,
    /// Score of the selected model.
    pub score: ModelScore,
    /// Mean epipolar error of the inliers.
    pub mean_error: f64,
    /// Index of the trial that produced the model.
    pub trial: usize,
}

impl<P> FundamentalEstimate<P> {
    /// Number of inlier correspondences.
    pub fn inlier_count(&self) -> usize {
        self.old_inliers.len()
    }
}

struct Trial {
    index: usize,
    fundamental: Matrix3<f64>,
    partition: InlierPartition,
    score: ModelScore,
}

/// Running champion of a run, mergeable across rayon splits.
#[derive(Default)]
struct Tally {
    best: Option<Trial>,
    numerical_failures: usize,
    last_failure: Option<EpipolarError>,
}

impl Tally {
    fn record(mut self, outcome: Result<Trial, EpipolarError>) -> Self {
        match outcome {
            Ok(trial) => {
                self.best = Some(match self.best.take() {
                    Some(best) => pick(best, trial),
                    None => trial,
                });
            }
            Err(err) => {
                self.numerical_failures += 1;
                self.last_failure = Some(err);
            }
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        let best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(pick(a, b)),
            (a, b) => a.or(b),
        };
        Self {
            best,
            numerical_failures: self.numerical_failures + other.numerical_failures,
            last_failure: other.last_failure.or(self.last_failure),
        }
    }
}

/// Strictly better score wins, ties go to the earlier trial.
fn pick(a: Trial, b: Trial) -> Trial {
    if b.score.improves_on(&a.score) {
        b
    } else if a.score.improves_on(&b.score) || a.index <= b.index {
        a
    } else {
        b
    }
}

/// Draw `sample_size` indices in `[0, n)` with replacement, sorted and deduplicated.
fn draw_sample(rng: &mut StdRng, n: usize, sample_size: usize) -> Vec<usize> {
    let mut sample: Vec<usize> = (0..sample_size).map(|_| rng.random_range(0..n)).collect();
    sample.sort_unstable();
    sample.dedup();
    sample
}

/// One sampler seed per trial, drawn from the run's master RNG.
fn trial_seeds(rng: &mut StdRng, iterations: usize) -> Vec<u64> {
    (0..iterations).map(|_| rng.random()).collect()
}

fn run_trial(
    index: usize,
    seed: u64,
    old: &[Vector3<f64>],
    new: &[Vector3<f64>],
    config: &RansacConfig,
) -> Option<Result<Trial, EpipolarError>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sample = draw_sample(&mut rng, old.len(), config.sample_size);
    let s_old: Vec<Vector3<f64>> = sample.iter().map(|&i| old[i]).collect();
    let s_new: Vec<Vector3<f64>> = sample.iter().map(|&i| new[i]).collect();

    let fundamental = match solve_fundamental(&s_old, &s_new, config.rank_projection) {
        Ok(f) => f,
        Err(err) => {
            log::debug!("trial {index}: skipped, {err}");
            return Some(Err(err));
        }
    };

    let partition = evaluate(old, new, &fundamental, config.threshold, config.min_inliers);
    let score = partition.score(config.selection);
    log::trace!(
        "trial {index}: {} unique samples, {} inliers, score {score:?}",
        sample.len(),
        partition.inlier_count
    );

    // only trials beating the sentinel can become the champion
    if !score.improves_on(&ModelScore::unusable(config.selection)) {
        return None;
    }
    Some(Ok(Trial {
        index,
        fundamental,
        partition,
        score,
    }))
}

/// Estimate a fundamental matrix with RANSAC over the eight-point solver.
///
/// - `old`: homogeneous points in the previous frame
/// - `new`: corresponding homogeneous points in the current frame
///
/// Runs exactly `config.iterations` trials. Each trial fits a model to a
/// random sample and scores it on the whole set; the champion is replaced
/// only by a strictly better score.
///
/// # Errors
///
/// - [`EpipolarError::InsufficientCorrespondences`] for fewer than 8 points,
/// - [`EpipolarError::NoViableModel`] when no trial beat the unusable sentinel,
/// - [`EpipolarError::SvdFailed`] when every trial failed numerically.
pub fn ransac_fundamental(
    old: &[Vector3<f64>],
    new: &[Vector3<f64>],
    config: &RansacConfig,
) -> Result<FundamentalEstimate<Vector3<f64>>, EpipolarError> {
    config.validate()?;
    check_lengths(old, new)?;
    let n = old.len();
    if n < MIN_CORRESPONDENCES {
        return Err(EpipolarError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: n,
        });
    }

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    // seeds are drawn up front so that sequential and parallel runs see the same trials
    let seeds = trial_seeds(&mut rng, config.iterations);

    let tally = if config.parallel {
        seeds
            .par_iter()
            .enumerate()
            .filter_map(|(i, &seed)| run_trial(i, seed, old, new, config))
            .fold(Tally::default, Tally::record)
            .reduce(Tally::default, Tally::merge)
    } else {
        seeds
            .iter()
            .enumerate()
            .filter_map(|(i, &seed)| run_trial(i, seed, old, new, config))
            .fold(Tally::default(), Tally::record)
    };

    let best = match tally.best {
        Some(best) => best,
        None => {
            if tally.numerical_failures == config.iterations {
                if let Some(err) = tally.last_failure {
                    return Err(err);
                }
            }
            return Err(EpipolarError::NoViableModel {
                iterations: config.iterations,
            });
        }
    };

    log::debug!(
        "selected trial {} with {} / {} inliers ({} numerical failures)",
        best.index,
        best.partition.inlier_count,
        n,
        tally.numerical_failures
    );

    let (old_inliers, new_inliers) = best.partition.split(old, new);
    Ok(FundamentalEstimate {
        fundamental: best.fundamental,
        mean_error: best.partition.mean_error(),
        inlier_mask: best.partition.mask,
        old_inliers,
        new_inliers,
        score: best.score,
        trial: best.index,
    })
}

/// Robust fundamental matrix between two sets of pixel correspondences.
///
/// Points are scaled by `scale`, lifted to homogeneous coordinates and passed
/// to [`ransac_fundamental`]. The returned matrix is mapped back to pixel
/// coordinates with `Tᵗ · F · T` and the inliers are the caller's own pixel
/// points.
pub fn find_fundamental_matrix(
    old: &[Vector2<f64>],
    new: &[Vector2<f64>],
    scale: &CoordinateScale,
    config: &RansacConfig,
) -> Result<FundamentalEstimate<Vector2<f64>>, EpipolarError> {
    let old_h = to_homogeneous(&scale.normalize(old));
    let new_h = to_homogeneous(&scale.normalize(new));
    let estimate = ransac_fundamental(&old_h, &new_h, config)?;

    let mut old_inliers = Vec::with_capacity(estimate.inlier_count());
    let mut new_inliers = Vec::with_capacity(estimate.inlier_count());
    for ((keep, o), n) in estimate.inlier_mask.iter().zip(old).zip(new) {
        if *keep {
            old_inliers.push(*o);
            new_inliers.push(*n);
        }
    }

    Ok(FundamentalEstimate {
        fundamental: scale.denormalize_fundamental(&estimate.fundamental),
        inlier_mask: estimate.inlier_mask,
        old_inliers,
        new_inliers,
        score: estimate.score,
        mean_error: estimate.mean_error,
        trial: estimate.trial,
    })
}

use argh::FromArgs;
use monovo_epipolar::{
    find_fundamental_matrix, CoordinateScale, RansacConfig, SelectionMode,
};
use nalgebra::{Matrix3, Rotation3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const IMAGE_WIDTH: u32 = 1226;
const IMAGE_HEIGHT: u32 = 370;

/// Estimates a fundamental matrix from synthetic correspondences with outliers
#[derive(Debug, FromArgs)]
struct Args {
    /// number of correspondences consistent with the camera motion
    #[argh(option, short = 'n', default = "500")]
    inliers: usize,

    /// number of random mismatches
    #[argh(option, short = 'o', default = "50")]
    outliers: usize,

    /// number of RANSAC trials
    #[argh(option, short = 'i', default = "25")]
    iterations: usize,

    /// indices drawn per trial before deduplication
    #[argh(option, short = 's', default = "25")]
    sample_size: usize,

    /// inlier threshold on the epipolar error in normalized coordinates
    #[argh(option, short = 't', default = "1e-6")]
    threshold: f64,

    /// seed for the scene and the sampler
    #[argh(option, default = "42")]
    seed: u64,

    /// select the model with the lowest mean inlier error
    #[argh(switch)]
    min_error: bool,

    /// evaluate trials in parallel
    #[argh(switch, short = 'p')]
    parallel: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // KITTI left grayscale camera
    let k = Matrix3::new(
        721.5377, 0.0, 609.5593, //
        0.0, 721.5377, 172.854, //
        0.0, 0.0, 1.0,
    );
    let rotation = Rotation3::from_euler_angles(0.0, 0.015, 0.0).into_inner();
    let translation = Vector3::new(0.02, -0.01, -0.9);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let project = |p: Vector3<f64>| {
        let q = k * (p / p.z);
        Vector2::new(q.x, q.y)
    };
    let in_image = |p: &Vector2<f64>| {
        p.x >= 0.0 && p.x < IMAGE_WIDTH as f64 && p.y >= 0.0 && p.y < IMAGE_HEIGHT as f64
    };

    let mut old = Vec::with_capacity(args.inliers + args.outliers);
    let mut new = Vec::with_capacity(args.inliers + args.outliers);
    while old.len() < args.inliers {
        let x = Vector3::new(
            rng.random_range(-15.0..15.0),
            rng.random_range(-2.0..3.0),
            rng.random_range(5.0..60.0),
        );
        let (p, q) = (project(x), project(rotation * x + translation));
        if in_image(&p) && in_image(&q) {
            old.push(p);
            new.push(q);
        }
    }
    for _ in 0..args.outliers {
        old.push(Vector2::new(
            rng.random_range(0.0..IMAGE_WIDTH as f64),
            rng.random_range(0.0..IMAGE_HEIGHT as f64),
        ));
        new.push(Vector2::new(
            rng.random_range(0.0..IMAGE_WIDTH as f64),
            rng.random_range(0.0..IMAGE_HEIGHT as f64),
        ));
    }

    let config = RansacConfig {
        iterations: args.iterations,
        sample_size: args.sample_size,
        threshold: args.threshold,
        selection: if args.min_error {
            SelectionMode::MinError
        } else {
            SelectionMode::MaxInliers
        },
        random_seed: Some(args.seed),
        parallel: args.parallel,
        ..Default::default()
    };
    let scale = CoordinateScale::from_image_size(IMAGE_WIDTH, IMAGE_HEIGHT)?;

    let start = std::time::Instant::now();
    let estimate = find_fundamental_matrix(&old, &new, &scale, &config)?;
    log::info!("estimated in {:?}", start.elapsed());

    let true_inliers = estimate.inlier_mask[..args.inliers]
        .iter()
        .filter(|&&m| m)
        .count();
    let false_inliers = estimate.inlier_count() - true_inliers;

    // ground truth in pixels, both normalized to unit Frobenius norm with a common sign
    let k_inv = k.try_inverse().ok_or("singular intrinsics")?;
    let f_true = k_inv.transpose() * translation.cross_matrix() * rotation * k_inv;
    let f_true = f_true / f_true.norm();
    let f = estimate.fundamental / estimate.fundamental.norm();
    let distance = (f - f_true).norm().min((f + f_true).norm());

    println!("trial:          {}", estimate.trial);
    println!("score:          {:?}", estimate.score);
    println!(
        "inliers:        {} ({} true, {} false)",
        estimate.inlier_count(),
        true_inliers,
        false_inliers
    );
    println!("mean error:     {:e}", estimate.mean_error);
    println!("distance to F*: {distance:e}");
    println!("F = {f}");

    Ok(())
}

use nalgebra::Vector3;

/// Source of the metric scale between two frames.
///
/// Monocular motion is only recovered up to scale, so the length of each
/// frame-to-frame translation comes from outside the pipeline.
pub trait ScaleSource {
    /// Distance travelled between `previous_frame` and `current_frame`, if known.
    fn absolute_scale(&mut self, previous_frame: usize, current_frame: usize) -> Option<f64>;
}

impl<F> ScaleSource for F
where
    F: FnMut(usize, usize) -> Option<f64>,
{
    fn absolute_scale(&mut self, previous_frame: usize, current_frame: usize) -> Option<f64> {
        self(previous_frame, current_frame)
    }
}

/// Scale taken from known camera positions, one per frame.
#[derive(Clone, Debug, Default)]
pub struct GroundTruthScale {
    positions: Vec<Vector3<f64>>,
}

impl GroundTruthScale {
    /// Create a scale source from per-frame camera positions.
    pub fn new(positions: Vec<Vector3<f64>>) -> Self {
        Self { positions }
    }

    /// The camera position of `frame`, if known.
    pub fn position(&self, frame: usize) -> Option<&Vector3<f64>> {
        self.positions.get(frame)
    }
}

impl ScaleSource for GroundTruthScale {
    fn absolute_scale(&mut self, previous_frame: usize, current_frame: usize) -> Option<f64> {
        let previous = self.positions.get(previous_frame)?;
        let current = self.positions.get(current_frame)?;
        Some((current - previous).norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ground_truth_scale() {
        let mut source = GroundTruthScale::new(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.8),
            Vector3::new(0.3, 0.0, 1.2),
        ]);
        assert_relative_eq!(source.absolute_scale(0, 1).unwrap(), 0.8);
        assert_relative_eq!(source.absolute_scale(1, 2).unwrap(), 0.5);
        assert_eq!(source.absolute_scale(2, 3), None);
        assert_eq!(source.position(1), Some(&Vector3::new(0.0, 0.0, 0.8)));
    }

    #[test]
    fn test_closure_scale() {
        let mut calls = Vec::new();
        let mut source = |previous: usize, current: usize| {
            calls.push((previous, current));
            Some(1.5)
        };
        assert_eq!(source.absolute_scale(4, 5), Some(1.5));
        assert_eq!(calls, vec![(4, 5)]);
    }
}

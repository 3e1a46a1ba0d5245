use nalgebra::Vector3;

/// Sequence of estimated camera positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    positions: Vec<Vector3<f64>>,
}

impl Trajectory {
    /// Create an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position.
    pub fn push(&mut self, position: Vector3<f64>) {
        self.positions.push(position);
    }

    /// All positions in insertion order.
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    /// The most recent position.
    pub fn last(&self) -> Option<&Vector3<f64>> {
        self.positions.last()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no position was recorded.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of the distances between consecutive positions.
    pub fn path_length(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trajectory() {
        let mut trajectory = Trajectory::new();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.last(), None);
        assert_eq!(trajectory.path_length(), 0.0);

        trajectory.push(Vector3::new(0.0, 0.0, 0.0));
        trajectory.push(Vector3::new(3.0, 4.0, 0.0));
        trajectory.push(Vector3::new(3.0, 4.0, 2.0));
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.last(), Some(&Vector3::new(3.0, 4.0, 2.0)));
        assert_eq!(trajectory.positions()[1], Vector3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(trajectory.path_length(), 7.0);
    }
}

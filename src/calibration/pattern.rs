//! Chessboard geometry and its planar object-point template.

use crate::config::PatternConfig;
use glam::Vec3;

/// Inner-corner grid of a chessboard target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPattern {
    /// Inner corners per row.
    pub columns: u32,
    /// Inner corners per column.
    pub rows: u32,
    /// Square edge length in meters.
    pub square_size: f32,
}

impl CalibrationPattern {
    pub fn new(columns: u32, rows: u32, square_size: f32) -> Self {
        Self {
            columns,
            rows,
            square_size,
        }
    }

    pub fn corner_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Corner positions on the board plane (z = 0), row by row with x varying fastest.
    ///
    /// This is the order in which the detector reports corners, so index `i`
    /// of the template corresponds to index `i` of every detection.
    pub fn object_points(&self) -> Vec<Vec3> {
        let mut points = Vec::with_capacity(self.corner_count());
        for row in 0..self.rows {
            for col in 0..self.columns {
                points.push(Vec3::new(
                    col as f32 * self.square_size,
                    row as f32 * self.square_size,
                    0.0,
                ));
            }
        }
        points
    }
}

impl From<PatternConfig> for CalibrationPattern {
    fn from(config: PatternConfig) -> Self {
        Self::new(config.columns, config.rows, config.square_size)
    }
}

impl Default for CalibrationPattern {
    fn default() -> Self {
        PatternConfig::default().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_layout() {
        let pattern = CalibrationPattern::new(4, 3, 0.5);
        let points = pattern.object_points();
        assert_eq!(points.len(), 12);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[1], Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(points[4], Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(points[11], Vec3::new(1.5, 1.0, 0.0));
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_default_board() {
        let pattern = CalibrationPattern::default();
        assert_eq!(pattern.corner_count(), 260);
        let last = *pattern.object_points().last().unwrap();
        assert!((last.x - 19.0 * 0.02).abs() < 1e-6);
        assert!((last.y - 12.0 * 0.02).abs() < 1e-6);
    }
}

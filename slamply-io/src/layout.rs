//! Positional column layouts of SLAM CSV output

use crate::table::NumericRow;
use serde::{Deserialize, Serialize};
use slamply_core::{Error, Point3d, Result};

/// Which columns of a row hold the x, y and z coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl ColumnLayout {
    /// Map points: `pos_x, pos_y, pos_z` in the first three columns
    pub const POINT_CLOUD: ColumnLayout = ColumnLayout::new(0, 1, 2);

    /// Camera trajectory rows: camera translation in columns 5, 6 and 7.
    /// Every column must be numeric, so an image path column has to be
    /// stripped or replaced before export.
    pub const TRAJECTORY: ColumnLayout = ColumnLayout::new(5, 6, 7);

    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Fewest fields a row needs for this layout
    pub const fn min_width(&self) -> usize {
        let max = if self.x > self.y { self.x } else { self.y };
        let max = if max > self.z { max } else { self.z };
        max + 1
    }

    /// Extract the position from a row, rejecting rows that are too narrow
    pub fn extract(&self, row: &NumericRow) -> Result<Point3d> {
        if row.values.len() < self.min_width() {
            return Err(Error::input_format(
                row.line,
                format!(
                    "row has {} fields, at least {} required",
                    row.values.len(),
                    self.min_width()
                ),
            ));
        }

        Ok(Point3d::new(row.get(self.x)?, row.get(self.y)?, row.get(self.z)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: Vec<f64>) -> NumericRow {
        NumericRow { line: 4, values }
    }

    #[test]
    fn test_min_width() {
        assert_eq!(ColumnLayout::POINT_CLOUD.min_width(), 3);
        assert_eq!(ColumnLayout::TRAJECTORY.min_width(), 8);
        assert_eq!(ColumnLayout::new(9, 0, 4).min_width(), 10);
    }

    #[test]
    fn test_extract_point_cloud() {
        let p = ColumnLayout::POINT_CLOUD
            .extract(&row(vec![1.0, 2.0, 3.0, 99.0]))
            .unwrap();
        assert_eq!(p, Point3d::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_extract_trajectory() {
        let values = vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 1.0];
        let p = ColumnLayout::TRAJECTORY.extract(&row(values)).unwrap();
        assert_eq!(p, Point3d::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_extract_rejects_narrow_row() {
        let err = ColumnLayout::TRAJECTORY
            .extract(&row(vec![0.0; 7]))
            .unwrap_err();
        match err {
            Error::InputFormat { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("at least 8"));
            }
            other => panic!("Expected input format error, got {:?}", other),
        }
    }
}

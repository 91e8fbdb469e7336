//! Core traits for slamply

use crate::{point::*, point_cloud::*};

/// Anything that has a position in world space
pub trait Positioned {
    fn position(&self) -> Point3d;
}

impl Positioned for Point3d {
    fn position(&self) -> Point3d {
        *self
    }
}

impl Positioned for ColoredPoint3d {
    fn position(&self) -> Point3d {
        self.position
    }
}

/// Trait for objects with an axis aligned extent
pub trait Bounded {
    /// Minimum and maximum corners, or `None` when there is nothing to bound
    fn bounding_box(&self) -> Option<(Point3d, Point3d)>;

    /// Center of the bounding box
    fn center(&self) -> Option<Point3d> {
        self.bounding_box()
            .map(|(min, max)| nalgebra::center(&min, &max))
    }
}

impl<T: Positioned> Bounded for PointCloud<T> {
    fn bounding_box(&self) -> Option<(Point3d, Point3d)> {
        let mut points = self.iter().map(Positioned::position);
        let first = points.next()?;

        Some(points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_cloud_has_no_bounds() {
        let cloud = PointCloud3d::new();
        assert!(cloud.bounding_box().is_none());
        assert!(cloud.center().is_none());
    }

    #[test]
    fn test_bounding_box() {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(1.0, -2.0, 3.0),
            Point3d::new(-1.0, 4.0, 0.5),
            Point3d::new(0.0, 0.0, 9.0),
        ]);
        let (min, max) = cloud.bounding_box().unwrap();
        assert_eq!(min, Point3d::new(-1.0, -2.0, 0.5));
        assert_eq!(max, Point3d::new(1.0, 4.0, 9.0));

        let center = cloud.center().unwrap();
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 1.0);
        assert_relative_eq!(center.z, 4.75);
    }

    #[test]
    fn test_colored_bounds_follow_positions() {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, 2.0, 2.0),
        ])
        .colorize(Rgb::LIGHT_GREEN);
        let (min, max) = cloud.bounding_box().unwrap();
        assert_eq!(min, Point3d::origin());
        assert_eq!(max, Point3d::new(2.0, 2.0, 2.0));
    }
}

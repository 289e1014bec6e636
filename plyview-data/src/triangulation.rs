//! Delaunay triangulation for point clouds.
//!
//! PLY files without face data still need a surface to shade. This module
//! projects the points onto the plane with the largest spread and runs 2D
//! Delaunay triangulation on the projection.

use delaunator::{Point, triangulate};
use glam::Vec3;
use tracing::{debug, warn};

/// Plane a point cloud is projected onto before 2D triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionPlane {
    XY,
    XZ,
    YZ,
}

impl ProjectionPlane {
    fn project(self, p: Vec3) -> Point {
        let (x, y) = match self {
            Self::XY => (p.x, p.y),
            Self::XZ => (p.x, p.z),
            Self::YZ => (p.y, p.z),
        };
        Point {
            x: x as f64,
            y: y as f64,
        }
    }
}

/// Analyze a point cloud and pick the projection plane with the largest
/// spread (the plane orthogonal to the smallest extent dimension).
pub fn best_projection_plane(positions: &[Vec3]) -> ProjectionPlane {
    if positions.is_empty() {
        return ProjectionPlane::XY;
    }

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for pos in positions {
        min = min.min(*pos);
        max = max.max(*pos);
    }
    let extent = max - min;

    if extent.z <= extent.x && extent.z <= extent.y {
        ProjectionPlane::XY
    } else if extent.y <= extent.x && extent.y <= extent.z {
        ProjectionPlane::XZ
    } else {
        ProjectionPlane::YZ
    }
}

/// Triangulate a point cloud, projecting onto the best-spread plane.
///
/// Returns triangle index triplets into `positions`.
pub fn triangulate_points(positions: &[Vec3]) -> Vec<[u32; 3]> {
    triangulate_points_on(positions, best_projection_plane(positions))
}

/// Triangulate a point cloud after projecting onto a specific plane.
pub fn triangulate_points_on(positions: &[Vec3], plane: ProjectionPlane) -> Vec<[u32; 3]> {
    if positions.len() < 3 {
        warn!("Not enough points for triangulation (need at least 3)");
        return Vec::new();
    }

    let points: Vec<Point> = positions.iter().map(|&p| plane.project(p)).collect();
    let result = triangulate(&points);

    let mut triangles = Vec::with_capacity(result.triangles.len() / 3);
    for chunk in result.triangles.chunks_exact(3) {
        triangles.push([chunk[0] as u32, chunk[1] as u32, chunk[2] as u32]);
    }

    debug!(
        "Triangulated {} points into {} triangles ({:?} projection)",
        positions.len(),
        triangles.len(),
        plane
    );

    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_simple() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
        ];

        let triangles = triangulate_points(&positions);
        assert!(!triangles.is_empty());
        for triangle in &triangles {
            for &idx in triangle {
                assert!((idx as usize) < positions.len());
            }
        }
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let positions = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        assert!(triangulate_points(&positions).is_empty());
    }

    #[test]
    fn test_triangulate_empty_input() {
        assert!(triangulate_points(&[]).is_empty());
    }

    #[test]
    fn test_best_plane_avoids_flat_axis() {
        // Points flat in Z spread across XY.
        let flat_z = vec![
            Vec3::new(0.0, 0.0, 0.1),
            Vec3::new(4.0, 0.0, 0.1),
            Vec3::new(0.0, 3.0, 0.1),
        ];
        assert_eq!(best_projection_plane(&flat_z), ProjectionPlane::XY);

        // Points flat in Y spread across XZ.
        let flat_y = vec![
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::new(4.0, 0.1, 0.0),
            Vec3::new(0.0, 0.1, 3.0),
        ];
        assert_eq!(best_projection_plane(&flat_y), ProjectionPlane::XZ);
    }

    #[test]
    fn test_triangulate_grid_pattern() {
        let mut positions = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                positions.push(Vec3::new(x as f32, y as f32, 0.0));
            }
        }

        let triangles = triangulate_points(&positions);
        // A 5x5 grid triangulates into 2 * (5-1) * (5-1) = 32 triangles.
        assert_eq!(triangles.len(), 32);
    }
}

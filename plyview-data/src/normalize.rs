//! Geometry normalization: center on the origin, rescale to a canonical size.

use crate::ply::PlyGeometry;
use glam::Vec3;
use tracing::{debug, warn};

/// Length the largest bounding-box dimension is rescaled to.
pub const CANONICAL_EXTENT: f32 = 5.0;

/// Axis-aligned bounding extent of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: Vec3,
    pub max: Vec3,
}

impl Extent {
    /// Compute the extent of an iterator of positions. `None` when empty.
    pub fn from_positions(positions: impl Iterator<Item = Vec3>) -> Option<Self> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut count = 0usize;

        for pos in positions {
            min = min.min(pos);
            max = max.max(pos);
            count += 1;
        }

        (count > 0).then_some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extent dimensions.
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// Center the geometry on the origin and uniformly scale it so its largest
/// bounding-box dimension equals [`CANONICAL_EXTENT`].
///
/// Degenerate geometry (all points coincident) is translated to the origin
/// but left unscaled, since no finite scale factor exists for it.
pub fn normalize_geometry(geometry: &mut PlyGeometry) {
    let Some(extent) = Extent::from_positions(geometry.positions()) else {
        return;
    };

    let center = extent.center();
    for vertex in &mut geometry.vertices {
        vertex.position -= center;
    }

    let max_dimension = extent.max_dimension();
    if max_dimension <= 0.0 {
        warn!("Geometry has zero extent, skipping rescale");
        return;
    }

    let scale = CANONICAL_EXTENT / max_dimension;
    for vertex in &mut geometry.vertices {
        vertex.position *= scale;
    }

    debug!(
        "Normalized geometry: center was {:?}, scale factor {}",
        center, scale
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply::PlyVertex;

    fn geometry_from_positions(positions: &[Vec3]) -> PlyGeometry {
        PlyGeometry {
            vertices: positions
                .iter()
                .map(|&p| PlyVertex::new(p, Vec3::ONE))
                .collect(),
            triangles: Vec::new(),
        }
    }

    #[test]
    fn test_extent_of_unit_cube() {
        let extent = Extent::from_positions(
            [Vec3::ZERO, Vec3::ONE, Vec3::new(1.0, 0.0, 1.0)].into_iter(),
        )
        .unwrap();
        assert_eq!(extent.min, Vec3::ZERO);
        assert_eq!(extent.max, Vec3::ONE);
        assert_eq!(extent.center(), Vec3::splat(0.5));
        assert_eq!(extent.max_dimension(), 1.0);
    }

    #[test]
    fn test_extent_of_empty_set() {
        assert!(Extent::from_positions(std::iter::empty()).is_none());
    }

    #[test]
    fn test_normalize_rescales_largest_dimension_to_canonical() {
        let mut geometry = geometry_from_positions(&[
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(30.0, 4.0, 0.0),
            Vec3::new(20.0, 2.0, 1.0),
        ]);
        normalize_geometry(&mut geometry);

        let extent = Extent::from_positions(geometry.positions()).unwrap();
        assert!((extent.max_dimension() - CANONICAL_EXTENT).abs() < 1e-4);
        assert!(extent.center().length() < 1e-4);
    }

    #[test]
    fn test_normalize_preserves_aspect_ratio() {
        let mut geometry = geometry_from_positions(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 5.0, 2.0),
        ]);
        normalize_geometry(&mut geometry);

        let extent = Extent::from_positions(geometry.positions()).unwrap();
        let size = extent.size();
        assert!((size.x - 5.0).abs() < 1e-4);
        assert!((size.y - 2.5).abs() < 1e-4);
        assert!((size.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_degenerate_translates_without_scaling() {
        let mut geometry = geometry_from_positions(&[
            Vec3::new(7.0, -3.0, 2.0),
            Vec3::new(7.0, -3.0, 2.0),
        ]);
        normalize_geometry(&mut geometry);

        for vertex in &geometry.vertices {
            assert!(vertex.position.length() < 1e-6);
            assert!(vertex.position.is_finite());
        }
    }

    #[test]
    fn test_normalize_empty_geometry_is_a_noop() {
        let mut geometry = PlyGeometry::default();
        normalize_geometry(&mut geometry);
        assert!(geometry.vertices.is_empty());
    }
}

//! PLY vertex and geometry data structures.

use glam::Vec3;

/// A single vertex extracted from a PLY file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlyVertex {
    /// Position in the file's coordinate space.
    pub position: Vec3,
    /// RGB color (linear, 0-1 range).
    pub color: Vec3,
}

impl PlyVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Vertex and connectivity data parsed from a PLY payload.
///
/// `triangles` is empty for pure point clouds; callers that need a surface
/// can generate one with [`crate::triangulation::triangulate_points`].
#[derive(Debug, Clone, Default)]
pub struct PlyGeometry {
    pub vertices: Vec<PlyVertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl PlyGeometry {
    /// Whether the file carried face connectivity.
    pub fn has_faces(&self) -> bool {
        !self.triangles.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }
}

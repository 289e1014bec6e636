//! Plyview Data Crate
//!
//! PLY parsing and geometry processing for the viewer. This crate is
//! GPU-agnostic: it turns PLY payloads into vertex/triangle data and
//! prepares that data for display (normalization, triangulation).

pub mod normalize;
pub mod ply;
pub mod triangulation;

pub use normalize::{CANONICAL_EXTENT, Extent, normalize_geometry};
pub use ply::{PlyGeometry, PlyVertex, load_ply_file, parse_ply};
pub use triangulation::{ProjectionPlane, best_projection_plane, triangulate_points};

/// Errors produced while reading or interpreting a PLY payload.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PLY parsing error: {0}")]
    Parse(String),
    #[error("vertex {index} is missing property '{property}'")]
    MissingProperty { index: usize, property: &'static str },
    #[error("face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    FaceIndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },
}

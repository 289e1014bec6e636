//! PLY geometry types and loading.

mod loader;
mod vertex;

pub use loader::{load_ply_file, parse_ply};
pub use vertex::{PlyGeometry, PlyVertex};

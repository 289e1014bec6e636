//! Shader source code embedded at compile time.

/// Mesh vertex shader - transforms positions and passes vertex colors.
pub const MESH_VERTEX: &str = include_str!("../shaders/mesh_vertex.wgsl");

/// Mesh fragment shader - flat shading from screen-space derivatives.
pub const MESH_FRAGMENT: &str = include_str!("../shaders/mesh_fragment.wgsl");

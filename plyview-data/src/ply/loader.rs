//! PLY file loading functions.

use crate::PlyError;
use crate::ply::{PlyGeometry, PlyVertex};
use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Color used for vertices that carry no color properties.
const FALLBACK_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);

// Face structure for PLY files
#[derive(Deserialize, Debug)]
struct PlyFace {
    vertex_indices: Vec<i32>,
}

// PLY file structure
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
    #[serde(default, rename = "face")]
    face: Vec<PlyFace>,
}

/// Parse a PLY payload (ASCII or binary) from any reader.
///
/// Per-vertex colors are read from `red`/`green`/`blue`, then `r`/`g`/`b`;
/// uncolored vertices fall back to mid-grey. Faces with more than three
/// indices are fan-triangulated.
pub fn parse_ply(reader: impl Read + std::io::BufRead) -> Result<PlyGeometry, PlyError> {
    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY payload: {}", e);
        PlyError::Parse(e.to_string())
    })?;

    info!(
        "PLY payload parsed: {} vertices, {} faces",
        ply_data.vertex.len(),
        ply_data.face.len()
    );

    fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
        prop.and_then(|v| match v {
            JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
            _ => None,
        })
    }

    fn get_u8(prop: Option<&JsonValue>) -> Option<u8> {
        prop.and_then(|v| match v {
            JsonValue::Number(n) => n
                .as_u64()
                .map(|u| u as u8)
                .or_else(|| n.as_i64().map(|i| i as u8)),
            _ => None,
        })
    }

    let mut vertices = Vec::with_capacity(ply_data.vertex.len());

    for (index, vertex) in ply_data.vertex.iter().enumerate() {
        let x = get_f32(vertex.get("x")).ok_or(PlyError::MissingProperty {
            index,
            property: "x",
        })?;
        let y = get_f32(vertex.get("y")).ok_or(PlyError::MissingProperty {
            index,
            property: "y",
        })?;
        let z = get_f32(vertex.get("z")).ok_or(PlyError::MissingProperty {
            index,
            property: "z",
        })?;

        let color = if let (Some(r), Some(g), Some(b)) = (
            get_u8(vertex.get("red")),
            get_u8(vertex.get("green")),
            get_u8(vertex.get("blue")),
        ) {
            Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        } else if let (Some(r), Some(g), Some(b)) = (
            get_u8(vertex.get("r")),
            get_u8(vertex.get("g")),
            get_u8(vertex.get("b")),
        ) {
            Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        } else {
            FALLBACK_COLOR
        };

        vertices.push(PlyVertex {
            position: Vec3::new(x, y, z),
            color,
        });
    }

    let mut triangles = Vec::with_capacity(ply_data.face.len());
    for (face, ply_face) in ply_data.face.iter().enumerate() {
        let indices = &ply_face.vertex_indices;
        if indices.len() < 3 {
            warn!("Face {} has {} indices, skipping", face, indices.len());
            continue;
        }
        for &raw in indices {
            if raw < 0 || raw as usize >= vertices.len() {
                return Err(PlyError::FaceIndexOutOfRange {
                    face,
                    index: raw as i64,
                    vertex_count: vertices.len(),
                });
            }
        }
        // Fan triangulation covers quads and larger convex polygons.
        let i0 = indices[0] as u32;
        for pair in indices[1..].windows(2) {
            triangles.push([i0, pair[0] as u32, pair[1] as u32]);
        }
    }

    debug!(
        "Loaded {} vertices and {} triangles from PLY payload",
        vertices.len(),
        triangles.len()
    );
    Ok(PlyGeometry {
        vertices,
        triangles,
    })
}

/// Load a PLY file from disk.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_ply_file(path: impl AsRef<Path>) -> Result<PlyGeometry, PlyError> {
    debug!("Loading PLY from disk");
    let file = File::open(path.as_ref())?;
    parse_ply(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ascii_ply(body: &str) -> Cursor<Vec<u8>> {
        Cursor::new(body.as_bytes().to_vec())
    }

    const COLORED_TRIANGLE: &str = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0 0 0 255 0
0 1 0 0 0 255
3 0 1 2
";

    #[test]
    fn test_parse_colored_triangle() {
        let geometry = parse_ply(ascii_ply(COLORED_TRIANGLE)).unwrap();
        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.triangles, vec![[0, 1, 2]]);
        assert_eq!(geometry.vertices[0].color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(geometry.vertices[2].position, Vec3::new(0.0, 1.0, 0.0));
        assert!(geometry.has_faces());
    }

    #[test]
    fn test_parse_uncolored_points_fall_back_to_grey() {
        let ply = "\
ply
format ascii 1.0
element vertex 2
property float x
property float y
property float z
end_header
0 0 0
1 2 3
";
        let geometry = parse_ply(ascii_ply(ply)).unwrap();
        assert_eq!(geometry.vertices.len(), 2);
        assert!(!geometry.has_faces());
        assert_eq!(geometry.vertices[0].color, FALLBACK_COLOR);
        assert_eq!(geometry.vertices[1].position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_parse_quad_is_fan_triangulated() {
        let ply = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";
        let geometry = parse_ply(ascii_ply(ply)).unwrap();
        assert_eq!(geometry.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_face_index_out_of_range() {
        let ply = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 7
";
        let err = parse_ply(ascii_ply(ply)).unwrap_err();
        assert!(matches!(
            err,
            PlyError::FaceIndexOutOfRange {
                face: 0,
                index: 7,
                vertex_count: 3,
            }
        ));
    }

    #[test]
    fn test_garbage_payload_is_a_parse_error() {
        let err = parse_ply(ascii_ply("not a ply file")).unwrap_err();
        assert!(matches!(err, PlyError::Parse(_)));
    }
}

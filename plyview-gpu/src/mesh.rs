//! GPU mesh upload.

use crate::RendererError;
use glam::Mat4;
use plyview_data::PlyGeometry;
use tracing::debug;
use wgpu::util::DeviceExt as _;

/// Vertex layout for the mesh pipeline. Matches `mesh_vertex.wgsl`.
///
/// Flat shading derives the face normal in the fragment shader, so no
/// per-vertex normal is stored.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl MeshVertex {
    /// Vertex buffer layout for wgpu.
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// A renderable mesh: vertex/index buffers plus its model transform.
///
/// Dropping a `GpuMesh` releases its buffers; the viewer keeps at most one
/// alive and replaces it wholesale on each successful load.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_matrix: Mat4,
}

impl GpuMesh {
    /// Upload geometry to the GPU. The geometry must already be triangulated.
    pub fn upload(
        device: &wgpu::Device,
        geometry: &PlyGeometry,
        model_matrix: Mat4,
    ) -> Result<Self, RendererError> {
        if geometry.triangles.is_empty() {
            return Err(RendererError::EmptyGeometry);
        }

        let vertices: Vec<MeshVertex> = geometry
            .vertices
            .iter()
            .map(|v| MeshVertex {
                position: v.position.to_array(),
                color: v.color.to_array(),
            })
            .collect();

        let indices: Vec<u32> = geometry.triangles.iter().flatten().copied().collect();

        debug!(
            "Uploading mesh: {} vertices, {} indices",
            vertices.len(),
            indices.len()
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            model_matrix,
        })
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

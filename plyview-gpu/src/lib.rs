//! Rendering substrate for the viewer.
//!
//! Wraps wgpu device acquisition, surface management, mesh upload, and the
//! flat-shaded vertex-color pipeline. Everything above this crate talks in
//! terms of [`GpuMesh`] and [`SceneUniforms`]; everything below is wgpu.

mod mesh;
mod pipeline;
pub mod shaders;
mod surface;
mod types;

pub use mesh::{GpuMesh, MeshVertex};
pub use pipeline::{DEPTH_FORMAT, MeshPipeline};
pub use surface::SurfaceWrapper;
pub use types::SceneUniforms;

// Re-exported so downstream crates use one wgpu version.
pub use wgpu;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Create surface error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("Surface is not supported by the selected adapter")]
    IncompatibleSurface,
    #[error("Geometry has no triangles to upload")]
    EmptyGeometry,
}

/// Owns the wgpu instance, adapter, and device/queue pair.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await?;
        tracing::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("plyview device"),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Configure a freshly created surface for this device.
    pub fn configure_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let config = surface
            .get_default_config(&self.adapter, width.max(1), height.max(1))
            .ok_or(RendererError::IncompatibleSurface)?;
        surface.configure(&self.device, &config);
        Ok(SurfaceWrapper::new(surface, config))
    }

    /// Create a depth texture matching the surface dimensions.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

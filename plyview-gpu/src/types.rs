use glam::Mat4;

/// Shared scene uniform layout between host and shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_matrix: [[f32; 4]; 4],
    pub proj_matrix: [[f32; 4]; 4],
    pub model_matrix: [[f32; 4]; 4],
}

impl SceneUniforms {
    pub fn from_matrices(view: Mat4, proj: Mat4, model: Mat4) -> Self {
        Self {
            view_matrix: view.to_cols_array_2d(),
            proj_matrix: proj.to_cols_array_2d(),
            model_matrix: model.to_cols_array_2d(),
        }
    }
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self::from_matrices(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

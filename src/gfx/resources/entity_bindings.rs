//! Per-entity uniform bindings
//!
//! Every entity draw gets its own uniform buffer holding its transforms and
//! the full lighting parameter set. All three shader programs declare the same
//! block (`EntityUniforms` in the WGSL sources), bound at group 0.

use cgmath::{Matrix4, Vector3};

use crate::{
    state::{DirectionalLight, PointLight},
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Point light block, MUST match `PointLight` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// x = constant, y = linear, z = quadratic
    pub attenuation: [f32; 4],
}

impl From<&PointLight> for PointLightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: extend(light.position, 1.0),
            ambient: extend(light.ambient, 0.0),
            diffuse: extend(light.diffuse, 0.0),
            specular: extend(light.specular, 0.0),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
        }
    }
}

/// Directional light block, MUST match `DirectionalLight` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniform {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl From<&DirectionalLight> for DirectionalLightUniform {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction: extend(light.direction, 0.0),
            ambient: extend(light.ambient, 0.0),
            diffuse: extend(light.diffuse, 0.0),
            specular: extend(light.specular, 0.0),
        }
    }
}

/// Everything one draw call reads, MUST match `EntityUniforms` in the shaders.
///
/// Only vec4/mat4 members are used so the Rust layout equals the WGSL uniform
/// layout without manual padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model` for transforming normals
    pub normal: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub point_light: PointLightUniform,
    pub directional_light: DirectionalLightUniform,
    /// x = shininess
    pub material: [f32; 4],
}
// Total: 4*64 + 16 + 80 + 64 + 16 = 432 bytes

impl EntityUniforms {
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model.into()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view.into()
    }

    pub fn shininess(&self) -> f32 {
        self.material[0]
    }
}

fn extend(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

pub type EntityUBO = UniformBuffer<EntityUniforms>;

/// Uniform buffer and bind group for one entity
pub struct EntityBindings {
    ubo: EntityUBO,
    bind_group: wgpu::BindGroup,
}

impl EntityBindings {
    /// Layout shared by all shader programs at group 0
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Entity Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: binding_types::uniform_sized::<EntityUniforms>(),
                count: None,
            }],
        })
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let ubo = EntityUBO::new(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Entity Bind Group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { ubo, bind_group }
    }

    /// Uploads this frame's uniforms; unchanged content is skipped
    pub fn update(&mut self, queue: &wgpu::Queue, uniforms: EntityUniforms) {
        self.ubo.update_content(queue, uniforms);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

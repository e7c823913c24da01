//! Global uniform bindings for camera and lighting
//!
//! One uniform buffer bound at slot 0 in every pipeline carries the camera
//! matrices and the scene's additive light rig: a key directional light, an
//! overhead fill directional light and an ambient term.

use cgmath::{InnerSpace, Vector3};

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content. Must match `Globals` in the WGSL shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// xyz: normalized direction towards the key light, w: intensity
    key_light: [f32; 4],
    /// xyz: normalized direction towards the fill light, w: intensity
    fill_light: [f32; 4],
    /// rgb: ambient color, w: intensity
    ambient: [f32; 4],
}

/// A light infinitely far away in the direction of `position`.
#[derive(Copy, Clone, Debug)]
pub struct DirectionalLight {
    pub position: Vector3<f32>,
    pub intensity: f32,
}

impl DirectionalLight {
    fn packed(&self) -> [f32; 4] {
        let dir = self.position.normalize();
        [dir.x, dir.y, dir.z, self.intensity]
    }
}

/// The scene's additive light rig. No shadows are rendered.
#[derive(Copy, Clone, Debug)]
pub struct LightingRig {
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            key: DirectionalLight {
                position: Vector3::new(3.0, 5.0, 3.0),
                intensity: 5.0,
            },
            fill: DirectionalLight {
                position: Vector3::new(0.0, 10.0, 0.0),
                intensity: 2.0,
            },
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.5,
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Uploads camera and light data; called once per frame.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    rig: &LightingRig,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        key_light: rig.key.packed(),
        fill_light: rig.fill.packed(),
        ambient: [
            rig.ambient_color[0],
            rig.ambient_color[1],
            rig.ambient_color[2],
            rig.ambient_intensity,
        ],
    };

    ubo.update_content(queue, content);
}

/// Bind group layout and bind group for the global uniforms (slot 0).
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Globals Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` has not been called yet.
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_light_packs_normalized_direction() {
        let light = DirectionalLight {
            position: Vector3::new(0.0, 10.0, 0.0),
            intensity: 2.0,
        };
        let packed = light.packed();
        assert_eq!(packed, [0.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_default_rig_matches_scene_lighting() {
        let rig = LightingRig::default();
        assert_eq!(rig.key.intensity, 5.0);
        assert_eq!(rig.fill.intensity, 2.0);
        assert_eq!(rig.ambient_intensity, 1.5);
    }
}

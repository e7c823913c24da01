//! WGPU-based forward renderer
//!
//! Owns the surface, device and queue, the depth buffer, the global uniform
//! buffer and the two render pipelines: lit geometry and the matcap-shaded
//! text mesh. Everything is drawn in a single forward pass.

use std::sync::Arc;
use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightingRig},
        texture_resource::TextureResource,
    },
    scene::{object::DrawObject, object::Shading, scene::Scene},
};

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// Background clear color, a pale lavender (#f7d6ff).
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.9686,
    g: 0.8392,
    b: 1.0,
    a: 1.0,
};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    lighting_rig: LightingRig,

    matcap_layout: BindGroupLayoutWithDesc,
    matcap_texture: Option<TextureResource>,
    matcap_bind_group: Option<wgpu::BindGroup>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, creates the depth buffer and registers the lit and
    /// matcap pipelines.
    ///
    /// # Panics
    /// Panics if unable to create wgpu adapter or device
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        // Global uniform bindings for camera and the light rig
        let lighting_rig = LightingRig::default();
        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        // Per-object transform layout, must match Object::init_gpu_resources
        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Material layout from a throwaway bindings instance so the pipeline
        // layout matches the material system exactly
        let temp_material_bindings =
            crate::gfx::resources::material::MaterialBindings::new(&device);
        let material_bind_group_layout = temp_material_bindings.bind_group_layouts().clone();

        let matcap_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Matcap Bind Group Layout");

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        let _ = pipeline_manager.load_shader("lit", include_str!("lit.wgsl"));
        let _ = pipeline_manager.load_shader("matcap", include_str!("matcap.wgsl"));

        pipeline_manager.register_pipeline(
            "Lit",
            PipelineConfig::default()
                .with_label("LIT")
                .with_shader("lit")
                .with_depth_stencil(depth_texture.texture.clone())
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    transform_bind_group_layout.clone(),
                    material_bind_group_layout,
                ]),
        );

        pipeline_manager.register_pipeline(
            "Matcap",
            PipelineConfig::default()
                .with_label("MATCAP")
                .with_shader("matcap")
                // glyph outlines do not guarantee winding, so draw both faces
                .with_cull_mode(None)
                .with_depth_stencil(depth_texture.texture.clone())
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    transform_bind_group_layout,
                    matcap_layout.layout.clone(),
                ]),
        );

        let _ = pipeline_manager.create_all_pipelines();

        RenderEngine {
            device: device_handle,
            config,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            lighting_rig,
            matcap_layout,
            matcap_texture: None,
            matcap_bind_group: None,
        }
    }

    /// Installs the matcap texture for the text mesh from RGBA8 pixel data.
    ///
    /// May arrive any number of frames after startup; until then matcap
    /// objects fall back to the lit pipeline.
    pub fn set_matcap(&mut self, data: &[u8], width: u32, height: u32) {
        let texture = TextureResource::create_from_rgba_data(
            &self.device,
            &self.queue,
            data,
            width,
            height,
            "Matcap Texture",
        );

        let bind_group = BindGroupBuilder::new(&self.matcap_layout)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(&self.device, "Matcap Bind Group");

        self.matcap_texture = Some(texture);
        self.matcap_bind_group = Some(bind_group);
    }

    /// Uploads GPU resources for anything the scene acquired since last frame.
    ///
    /// Assets finish loading at arbitrary times, so this runs every frame and
    /// is a no-op once everything is resident.
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.ensure_gpu_resources(&self.device, &self.queue);
        scene.update_all_transforms(&self.queue);
    }

    /// Renders one frame: a single forward pass over all visible objects.
    ///
    /// Lit objects draw first with their materials, then the matcap text on
    /// top of the same depth buffer.
    pub fn render_frame(&mut self, scene: &Scene) {
        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("Failed to get surface texture!");

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);

            let use_matcap = self.matcap_bind_group.is_some();

            if let Some(pipeline) = self.pipeline_manager.get_pipeline("Lit") {
                render_pass.set_pipeline(pipeline);

                for object in scene.objects.iter() {
                    if !object.visible {
                        continue;
                    }
                    // text renders untextured until the matcap arrives
                    if object.shading == Shading::Matcap && use_matcap {
                        continue;
                    }

                    let Some(transform_bind_group) = object.get_transform_bind_group() else {
                        continue;
                    };

                    let material = scene.get_material_for_object(object);
                    if let Some(material_bind_group) = material.get_bind_group() {
                        render_pass.set_bind_group(1, transform_bind_group, &[]);
                        render_pass.set_bind_group(2, material_bind_group, &[]);
                        render_pass.draw_object(object);
                    } else {
                        log::debug!(
                            "skipping '{}', material '{}' has no GPU resources",
                            object.name,
                            material.name
                        );
                    }
                }
            }

            if use_matcap {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline("Matcap") {
                    render_pass.set_pipeline(pipeline);

                    if let Some(matcap_bind_group) = self.matcap_bind_group.as_ref() {
                        render_pass.set_bind_group(2, matcap_bind_group, &[]);

                        for object in scene.objects.iter() {
                            if !object.visible || object.shading != Shading::Matcap {
                                continue;
                            }
                            if let Some(transform_bind_group) = object.get_transform_bind_group()
                            {
                                render_pass.set_bind_group(1, transform_bind_group, &[]);
                                render_pass.draw_object(object);
                            }
                        }
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Updates camera and light uniform buffers; called once per frame.
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            &self.lighting_rig,
        );
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests are ignored so the swapchain never sees a
    /// degenerate configuration.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;

        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }
}

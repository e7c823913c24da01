use cgmath::Vector3;
use std::sync::{mpsc, Arc};
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    assembler,
    assets::{self, AssetEvent, AssetManifest},
    gfx::{
        camera::{
            camera_controller::CameraController, camera_utils::CameraManager,
            orbit_camera::OrbitCamera,
        },
        rendering::render_engine::RenderEngine,
        scene::Scene,
    },
    responsive,
};

/// Rendered pixel density is capped at 2x regardless of the display's actual
/// scale factor.
const MAX_PIXEL_RATIO: f64 = 2.0;

pub struct PatisserieApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    manifest: AssetManifest,
    assets_rx: Option<mpsc::Receiver<AssetEvent>>,
    start: Instant,
    logical_width: f32,
    logical_height: f32,
    scale_factor: f64,
}

impl PatisserieApp {
    /// Creates the application with the default asset manifest.
    pub async fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let mut camera = OrbitCamera::new(3.5, 0.3, 0.2, Vector3::new(0.0, 0.0, 0.0), 1.5);
        camera.bounds.min_distance = Some(1.1);
        let controller = CameraController::new(0.005, 0.1);

        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::new(camera_manager);

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                manifest: AssetManifest::default(),
                assets_rx: None,
                start: Instant::now(),
                logical_width: 1200.0,
                logical_height: 800.0,
                scale_factor: 1.0,
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    /// Surface size in physical pixels with the density cap applied.
    fn render_size(&self) -> (u32, u32) {
        let ratio = self.scale_factor.min(MAX_PIXEL_RATIO);
        (
            (self.logical_width as f64 * ratio).round().max(1.0) as u32,
            (self.logical_height as f64 * ratio).round().max(1.0) as u32,
        )
    }

    /// Folds finished asset loads into the scene. Runs every frame; idle once
    /// all loader threads have reported.
    fn drain_asset_events(&mut self) {
        let Some(rx) = self.assets_rx.as_ref() else {
            return;
        };

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        let width = self.logical_width;
        for event in events {
            match event {
                AssetEvent::Font(bytes) => {
                    if let Err(e) = assembler::install_text(&mut self.scene, &bytes, width) {
                        log::warn!("failed to build text mesh: {}", e);
                    }
                }
                AssetEvent::Matcap(image) => {
                    if let Some(engine) = self.render_engine.as_mut() {
                        engine.set_matcap(&image.pixels, image.width, image.height);
                    }
                }
                AssetEvent::Model(model) => {
                    let mut rng = rand::rng();
                    assembler::scatter_model(&mut self.scene, model, width, &mut rng);
                }
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("patisserie")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            self.scale_factor = window_handle.scale_factor();
            let PhysicalSize { width, height } = window_handle.inner_size();
            self.logical_width = width as f32 / self.scale_factor as f32;
            self.logical_height = height as f32 / self.scale_factor as f32;

            let camera = &mut self.scene.camera_manager.camera;
            camera.set_distance(responsive::camera_distance(self.logical_width));
            camera.resize_projection(width, height);

            let (render_width, render_height) = self.render_size();
            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, render_width, render_height).await
            });
            self.render_engine = Some(renderer);

            // kick off background loads once the GPU is up
            let (tx, rx) = mpsc::channel();
            assets::spawn_loads(&self.manifest, tx);
            self.assets_rx = Some(rx);
            self.start = Instant::now();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if self.render_engine.is_none() || self.window.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.logical_width = width as f32 / self.scale_factor as f32;
                self.logical_height = height as f32 / self.scale_factor as f32;

                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);

                // camera distance and text scale follow the breakpoint table
                self.scene
                    .camera_manager
                    .camera
                    .set_distance(responsive::camera_distance(self.logical_width));
                self.scene
                    .set_text_scale(responsive::text_scale(self.logical_width));

                let (render_width, render_height) = self.render_size();
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(render_width, render_height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.drain_asset_events();

                let elapsed = self.start.elapsed().as_secs_f32();
                self.scene.update(elapsed);

                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.update(self.scene.camera_manager.camera.uniform);
                    render_engine.prepare_scene(&mut self.scene);
                    render_engine.render_frame(&self.scene);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

//! Graphics module
//!
//! Camera system, scene management, GPU resources and the render engine for
//! the patisserie scene.

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;

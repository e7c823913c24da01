//! GPU resource management
//!
//! Global uniforms (camera + light rig), materials and texture resources.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightingRig};
pub use texture_resource::TextureResource;

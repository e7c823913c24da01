//! WGPU utility helpers
//!
//! Convenient builders for bind groups and a typed uniform buffer wrapper.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use binding_types::*;
pub use uniform_buffer::UniformBuffer;

//! Rendering infrastructure
//!
//! Pipeline management and the forward render engine.

pub mod pipeline_manager;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;

//! Scene management
//!
//! The scene container, renderable objects with meshes and transforms, and
//! the vertex format shared by all pipelines.

pub mod object;
pub mod scene;
pub mod vertex;

pub use object::{DrawObject, Mesh, Object, Shading};
pub use scene::{BounceTextGroup, Scene};
pub use vertex::Vertex3D;

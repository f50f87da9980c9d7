//! GPU resource management
//!
//! Uniform blocks, materials and the depth buffer.

pub mod entity_bindings;
pub mod material;
pub mod texture_resource;

pub use entity_bindings::{EntityBindings, EntityUniforms};
pub use material::{Material, MaterialBindings, MaterialUniform};
pub use texture_resource::TextureResource;

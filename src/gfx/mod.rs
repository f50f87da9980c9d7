//! # Graphics
//!
//! - [`camera`] - first-person fly camera and its input controller
//! - [`geometry`] - procedural stand-in shapes
//! - [`rendering`] - shaders, pipelines and the [`RenderEngine`]
//! - [`resources`] - uniform blocks, materials and the depth buffer
//! - [`scene`] - models and the per-frame uniform mapping

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;

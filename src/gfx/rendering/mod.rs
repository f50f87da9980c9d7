//! Core rendering functionality
//!
//! Shader programs, pipeline creation and frame submission.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shaders;

pub use pipeline_manager::{PipelineConfig, PipelineError, PipelineManager};
pub use render_engine::RenderEngine;
pub use shaders::ShaderProgram;

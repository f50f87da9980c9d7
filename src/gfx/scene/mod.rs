//! # Scene
//!
//! Drawable data and the per-frame mapping from [`crate::state::ProgramState`]
//! to shader uniforms.
//!
//! - [`Model`] - meshes and materials loaded from OBJ files
//! - [`FrameUpdater`] - advances entity angles and builds [`FrameUniforms`]
//! - [`Vertex3D`] - vertex layout shared by every pipeline

pub mod frame_updater;
pub mod model;
pub mod vertex;

pub use frame_updater::{EntityDraw, FrameUniforms, FrameUpdater, ViewMode};
pub use model::{DrawModel, Mesh, Model, ModelError};
pub use vertex::Vertex3D;

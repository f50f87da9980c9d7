//! # User Interface
//!
//! Dear ImGui overlay toggled with F1.
//!
//! - [`UiManager`] - imgui context, winit platform glue and wgpu renderer
//! - [`overlay`] - the "Scene" and "Camera info" windows editing
//!   [`crate::state::ProgramState`]

pub mod manager;
pub mod overlay;

pub use manager::UiManager;
pub use overlay::{draw_overlay, DragSpec};

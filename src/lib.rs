// src/lib.rs
//! Moonlit scene viewer
//!
//! A small real-time 3D scene viewer built on wgpu and winit. The crate keeps
//! all per-frame logic (camera control, entity motion, uniform mapping and the
//! persisted settings round-trip) free of GPU types so it can be tested on its
//! own; the [`app`] module wires it to the window, the render engine and the
//! imgui overlay.

pub mod app;
pub mod config;
pub mod gfx;
pub mod state;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::MoonlitApp;
pub use config::ViewerConfig;
pub use state::ProgramState;

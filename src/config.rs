//! Viewer configuration
//!
//! All tunables the viewer needs at startup live in [`ViewerConfig`]. The
//! defaults reproduce the reference scene; there are no command line flags.

use std::path::PathBuf;

use crate::gfx::scene::frame_updater::ViewMode;

/// Near clipping plane used by the projection matrix
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane used by the projection matrix
pub const Z_FAR: f32 = 100.0;
/// Material shininess pushed with every draw
pub const MATERIAL_SHININESS: f32 = 32.0;

/// Model files for the three scene entities
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub ground: PathBuf,
    /// Specular map applied to every ground material
    pub ground_specular_map: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("resources/objects/cat/12221_Cat_v1_l3.obj"),
            secondary: PathBuf::from("resources/objects/sun/Sun.obj"),
            ground: PathBuf::from("resources/objects/ground/terrain.obj"),
            ground_specular_map: PathBuf::from("resources/objects/ground/specular.png"),
        }
    }
}

/// Startup configuration for [`crate::MoonlitApp`]
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Current settings file (JSON)
    pub settings_path: PathBuf,
    /// Positional settings file read when `settings_path` does not exist yet
    pub legacy_settings_path: PathBuf,
    pub models: ModelPaths,
    /// Initial view transform; V switches it at runtime
    pub view_mode: ViewMode,
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "moonlit".to_string(),
            width: 800,
            height: 600,
            settings_path: PathBuf::from("resources/program_state.json"),
            legacy_settings_path: PathBuf::from("resources/program_state.txt"),
            models: ModelPaths::default(),
            view_mode: ViewMode::Full,
            vsync: true,
        }
    }
}


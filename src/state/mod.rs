//! # Scene State
//!
//! [`ProgramState`] is the single root aggregate of the viewer. It is created
//! once by the application shell and lent by reference to the camera
//! controller, the frame updater, the debug overlay and the settings store.
//!
//! ## Reference scene
//!
//! - `primary` - a model circling its base position at radius 2, tilted -90°
//!   about X; its orbit angle only moves when the user presses R
//! - `secondary` - a model spinning about Y at 10°/s
//! - `ground` - a static, scaled-up terrain below both

pub mod entity;
pub mod lights;
pub mod settings;

use cgmath::{Deg, Rad, Vector3};

use crate::gfx::camera::FlyCamera;

pub use entity::{EntityMotion, EntityTransform, SceneEntity};
pub use lights::{DirectionalLight, PointLight};
pub use settings::{LoadOutcome, SettingsError, SettingsRecord};

/// Units per second the primary entity drifts along +Z while R is held
pub const PRIMARY_DRIFT_SPEED: f32 = 0.1;
/// Orbit angle change per R key press or repeat, in radians
pub const PRIMARY_ORBIT_STEP_RAD: f32 = 0.1;
/// Spin rate of the secondary entity
pub const SECONDARY_SPIN_DEG_PER_SEC: f32 = 10.0;

/// Cursor behaviour requested by the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and grabbed by the window, drives the camera
    Captured,
    /// Visible, used by the overlay
    Free,
}

#[derive(Debug, Clone)]
pub struct ProgramState {
    pub clear_color: [f32; 3],
    pub gui_enabled: bool,
    pub camera: FlyCamera,
    pub camera_mouse_update_enabled: bool,
    pub primary: SceneEntity,
    pub secondary: SceneEntity,
    pub ground: SceneEntity,
    pub point_light: PointLight,
    pub directional_light: DirectionalLight,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            gui_enabled: false,
            camera: FlyCamera::new(Vector3::new(0.0, 0.0, 3.0)),
            camera_mouse_update_enabled: true,
            primary: SceneEntity::new(
                "primary",
                EntityTransform::new(Vector3::new(0.0, -3.0, -9.0), 0.05),
                EntityMotion::orbiting(2.0, Vector3::unit_x(), -90.0),
            ),
            secondary: SceneEntity::new(
                "secondary",
                EntityTransform::new(Vector3::new(2.0, 3.0, -10.0), 0.1),
                EntityMotion::spinning(Vector3::unit_y(), SECONDARY_SPIN_DEG_PER_SEC),
            ),
            ground: SceneEntity::new(
                "ground",
                EntityTransform::new(Vector3::new(0.0, -16.0, 0.0), 10.0),
                EntityMotion::stationary(),
            ),
            point_light: PointLight::default(),
            directional_light: DirectionalLight::default(),
        }
    }
}

impl ProgramState {
    /// Entities in draw order
    pub fn entities(&self) -> [&SceneEntity; 3] {
        [&self.primary, &self.secondary, &self.ground]
    }

    pub fn entities_mut(&mut self) -> [&mut SceneEntity; 3] {
        [&mut self.primary, &mut self.secondary, &mut self.ground]
    }

    pub fn cursor_mode(&self) -> CursorMode {
        if self.gui_enabled {
            CursorMode::Free
        } else {
            CursorMode::Captured
        }
    }

    /// Raw mouse motion turns the camera only while the cursor is captured and
    /// mouse updates are on
    pub fn mouse_look_active(&self) -> bool {
        self.cursor_mode() == CursorMode::Captured && self.camera_mouse_update_enabled
    }

    /// Flips the overlay and returns the cursor mode to apply
    ///
    /// Camera mouse updates are off while the overlay is open and back on once
    /// it closes.
    pub fn toggle_overlay(&mut self) -> CursorMode {
        self.gui_enabled = !self.gui_enabled;
        self.camera_mouse_update_enabled = !self.gui_enabled;
        self.cursor_mode()
    }

    /// Brings dependent flags in line after settings were loaded
    pub fn sync_overlay_flags(&mut self) {
        if self.gui_enabled {
            self.camera_mouse_update_enabled = false;
        }
    }

    /// Held R: slide the primary entity along +Z
    pub fn drift_primary(&mut self, delta_time: f32) {
        self.primary.transform.position.z += PRIMARY_DRIFT_SPEED * delta_time;
    }

    /// R press or repeat: step the primary orbit angle backwards
    pub fn step_primary_orbit(&mut self) {
        let step: Deg<f32> = Rad(PRIMARY_ORBIT_STEP_RAD).into();
        self.primary.transform.rotation_angle -= step.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ProgramState::default();
        assert_eq!(state.clear_color, [0.0, 0.0, 0.0]);
        assert!(!state.gui_enabled);
        assert!(state.camera_mouse_update_enabled);
        assert_eq!(state.camera.position, Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(state.primary.transform.scale, 0.05);
        assert_eq!(state.ground.transform.position, Vector3::new(0.0, -16.0, 0.0));
        assert!(state.secondary.motion.angle_is_time_varying);
        assert!(!state.primary.motion.angle_is_time_varying);
    }

    #[test]
    fn test_toggle_overlay_controls_mouse_updates() {
        let mut state = ProgramState::default();

        assert_eq!(state.toggle_overlay(), CursorMode::Free);
        assert!(state.gui_enabled);
        assert!(!state.camera_mouse_update_enabled);

        assert_eq!(state.toggle_overlay(), CursorMode::Captured);
        assert!(!state.gui_enabled);
        assert!(state.camera_mouse_update_enabled);
    }

    #[test]
    fn test_mouse_look_follows_overlay_and_checkbox() {
        let mut state = ProgramState::default();
        assert!(state.mouse_look_active());

        state.toggle_overlay();
        assert!(!state.mouse_look_active());
        // Ticking the checkbox while the overlay is open keeps the cursor free
        state.camera_mouse_update_enabled = true;
        assert!(!state.mouse_look_active());

        state.toggle_overlay();
        assert!(state.mouse_look_active());
        state.camera_mouse_update_enabled = false;
        assert!(!state.mouse_look_active());
    }

    #[test]
    fn test_sync_overlay_flags_after_load() {
        let mut state = ProgramState::default();
        state.gui_enabled = true;
        state.sync_overlay_flags();
        assert!(!state.camera_mouse_update_enabled);
        assert_eq!(state.cursor_mode(), CursorMode::Free);
    }

    #[test]
    fn test_primary_key_adjustments() {
        let mut state = ProgramState::default();
        state.drift_primary(0.5);
        assert!((state.primary.transform.position.z - (-9.0 + 0.05)).abs() < 1e-6);

        state.step_primary_orbit();
        let expected = -PRIMARY_ORBIT_STEP_RAD.to_degrees();
        assert!((state.primary.transform.rotation_angle - expected).abs() < 1e-4);
    }
}

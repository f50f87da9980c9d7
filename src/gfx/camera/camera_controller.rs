use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use super::fly_camera::{CameraMovement, FlyCamera};

/// Pixel scroll deltas are converted to wheel "lines" with this factor
pub const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

/// Keyboard and mouse adapter for [`FlyCamera`]
///
/// Movement keys are tracked as held state and applied once per frame with the
/// frame's delta time. Mouse look uses raw device motion, which keeps coming
/// while the cursor is grabbed and never saturates at the window edge.
#[derive(Debug, Default)]
pub struct CameraController {
    held: [bool; 4],
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(direction: CameraMovement) -> usize {
        match direction {
            CameraMovement::Forward => 0,
            CameraMovement::Backward => 1,
            CameraMovement::Left => 2,
            CameraMovement::Right => 3,
        }
    }

    /// Maps a key to a movement direction (WASD)
    pub fn movement_for_key(key: KeyCode) -> Option<CameraMovement> {
        match key {
            KeyCode::KeyW => Some(CameraMovement::Forward),
            KeyCode::KeyS => Some(CameraMovement::Backward),
            KeyCode::KeyA => Some(CameraMovement::Left),
            KeyCode::KeyD => Some(CameraMovement::Right),
            _ => None,
        }
    }

    /// Records key state; returns true when the key is a movement key
    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        match Self::movement_for_key(key) {
            Some(direction) => {
                self.held[Self::slot(direction)] = state == ElementState::Pressed;
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, direction: CameraMovement) -> bool {
        self.held[Self::slot(direction)]
    }

    /// Drops all held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held = [false; 4];
    }

    /// Applies every held movement key for this frame
    pub fn update_camera(&self, camera: &mut FlyCamera, delta_time: f32) {
        for direction in [
            CameraMovement::Forward,
            CameraMovement::Backward,
            CameraMovement::Left,
            CameraMovement::Right,
        ] {
            if self.is_held(direction) {
                camera.process_keyboard(direction, delta_time);
            }
        }
    }

    /// Feeds a raw mouse motion delta; the camera only turns when `enabled`
    ///
    /// Device y grows downward, so it is reversed before reaching the pitch.
    pub fn process_mouse_motion(&self, delta: (f64, f64), camera: &mut FlyCamera, enabled: bool) {
        if enabled {
            camera.process_mouse_movement(delta.0 as f32, -delta.1 as f32, true);
        }
    }

    pub fn process_scroll(&self, delta: &MouseScrollDelta, camera: &mut FlyCamera) {
        camera.process_mouse_scroll(scroll_lines(delta));
    }
}

/// Vertical scroll amount in wheel lines
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
            *y as f32 / PIXELS_PER_SCROLL_LINE
        }
    }
}

//! Debug overlay
//!
//! Two imgui windows that edit [`ProgramState`] in place. Every bounded value
//! is declared as a [`DragSpec`]; the drag widgets clamp while dragging and an
//! edited value is clamped again so typed-in input obeys the same range.
//! Values nobody touched are left alone, even when they start out of range.

use imgui::{Drag, SliderFlags, Ui};

use crate::state::ProgramState;

/// Declared range and step of a bounded scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSpec {
    pub label: &'static str,
    pub speed: f32,
    pub min: f32,
    pub max: f32,
}

impl DragSpec {
    pub const fn new(label: &'static str, speed: f32, min: f32, max: f32) -> Self {
        Self {
            label,
            speed,
            min,
            max,
        }
    }

    /// Brings `value` into range; NaN falls back to the lower bound
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Draws the widget and returns whether the value changed
    pub fn build(&self, ui: &Ui, value: &mut f32) -> bool {
        let changed = Drag::new(self.label)
            .range(self.min, self.max)
            .speed(self.speed)
            .flags(SliderFlags::ALWAYS_CLAMP)
            .build(ui, value);
        if changed {
            *value = self.clamp(*value);
        }
        changed
    }
}

pub const PRIMARY_SCALE: DragSpec = DragSpec::new("Cat scale", 0.05, 0.1, 4.0);
pub const LIGHT_CONSTANT: DragSpec = DragSpec::new("Light constant", 0.05, 0.0, 1.0);
pub const LIGHT_LINEAR: DragSpec = DragSpec::new("Light linear", 0.05, 0.0, 1.0);
pub const LIGHT_QUADRATIC: DragSpec = DragSpec::new("Light quadratic", 0.05, 0.0, 1.0);

/// Drag speed for unbounded positions
const POSITION_SPEED: f32 = 0.05;

fn drag_vec3(ui: &Ui, label: &str, value: &mut cgmath::Vector3<f32>) -> bool {
    let mut components: [f32; 3] = (*value).into();
    let changed = Drag::new(label)
        .speed(POSITION_SPEED)
        .build_array(ui, &mut components);
    if changed {
        *value = components.into();
    }
    changed
}

/// Builds the overlay windows; does nothing while the overlay is hidden
pub fn draw_overlay(ui: &Ui, state: &mut ProgramState) {
    if !state.gui_enabled {
        return;
    }

    ui.window("Scene")
        .size([360.0, 300.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.color_edit3("Background", &mut state.clear_color);
            drag_vec3(ui, "Cat position", &mut state.primary.transform.position);
            PRIMARY_SCALE.build(ui, &mut state.primary.transform.scale);

            ui.separator();
            drag_vec3(ui, "Light position", &mut state.point_light.position);
            LIGHT_CONSTANT.build(ui, &mut state.point_light.constant);
            LIGHT_LINEAR.build(ui, &mut state.point_light.linear);
            LIGHT_QUADRATIC.build(ui, &mut state.point_light.quadratic);
        });

    ui.window("Camera info")
        .size([360.0, 160.0], imgui::Condition::FirstUseEver)
        .position([20.0, 340.0], imgui::Condition::FirstUseEver)
        .build(|| {
            let camera = &state.camera;
            ui.text(format!(
                "Position: ({:.2}, {:.2}, {:.2})",
                camera.position.x, camera.position.y, camera.position.z
            ));
            ui.text(format!("(yaw, pitch): ({:.2}, {:.2})", camera.yaw, camera.pitch));
            ui.text(format!(
                "Front: ({:.2}, {:.2}, {:.2})",
                camera.front.x, camera.front.y, camera.front.z
            ));
            ui.checkbox(
                "Camera mouse update",
                &mut state.camera_mouse_update_enabled,
            );
        });
}

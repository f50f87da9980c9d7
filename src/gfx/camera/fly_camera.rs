use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

/// Default yaw in degrees, looking down the negative Z axis
pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
/// Movement speed in world units per second
pub const SPEED: f32 = 2.5;
/// Degrees of rotation per pixel of cursor travel
pub const SENSITIVITY: f32 = 0.1;
/// Default vertical field of view in degrees
pub const ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
/// Up direction of the world, shared by every camera
pub const WORLD_UP: Vector3<f32> = Vector3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

/// Discrete movement directions fed by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-fly camera driven by yaw/pitch angles
///
/// `front`, `right` and `up` are derived from `yaw` and `pitch` and always form
/// an orthonormal basis. Angles and `zoom` are in degrees; `zoom` doubles as
/// the vertical field of view of the projection.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0))
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>) -> Self {
        let mut camera = Self {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: WORLD_UP,
            yaw: YAW,
            pitch: PITCH,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_camera_vectors();
        camera
    }

    /// Look-at transform from `position` towards `position + front`
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(Point3::from_vec(self.position), self.front, self.up)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = (self.zoom - yoffset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Restores a persisted orientation
    ///
    /// With angles the stored `front` is kept as-is and `right`/`up` are
    /// re-derived from it. Without angles (legacy settings) yaw and pitch are
    /// recovered from `front`, pitch clamped to the usual limit, and the whole
    /// basis is rebuilt from them. A `front` that cannot span a basis with
    /// `world_up` (zero, or straight up or down) never reaches the basis; the
    /// angles decide instead.
    pub fn restore_orientation(&mut self, front: Vector3<f32>, angles: Option<(f32, f32)>) {
        match angles {
            Some((yaw, pitch)) => {
                self.yaw = yaw;
                self.pitch = pitch;
                if spans_basis(front, self.world_up) {
                    self.front = if (front.magnitude2() - 1.0).abs() > 1e-4 {
                        front.normalize()
                    } else {
                        front
                    };
                    self.update_basis_from_front();
                } else {
                    self.update_camera_vectors();
                }
            }
            None => {
                if front.magnitude2() >= f32::EPSILON {
                    let front = front.normalize();
                    self.yaw = front.z.atan2(front.x).to_degrees();
                    self.pitch = front
                        .y
                        .clamp(-1.0, 1.0)
                        .asin()
                        .to_degrees()
                        .clamp(-PITCH_LIMIT, PITCH_LIMIT);
                }
                self.update_camera_vectors();
            }
        }
    }

    fn update_camera_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();

        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.update_basis_from_front();
    }

    fn update_basis_from_front(&mut self) {
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Whether `front` and `world_up` are far enough from parallel to derive a
/// right vector from their cross product
pub fn spans_basis(front: Vector3<f32>, world_up: Vector3<f32>) -> bool {
    let length2 = front.magnitude2();
    length2 >= f32::EPSILON && (front / length2.sqrt()).cross(world_up).magnitude2() > 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(camera: &FlyCamera) {
        assert!((camera.front.magnitude() - 1.0).abs() < EPS);
        assert!((camera.right.magnitude() - 1.0).abs() < EPS);
        assert!((camera.up.magnitude() - 1.0).abs() < EPS);
        assert!(camera.front.dot(camera.right).abs() < EPS);
        assert!(camera.front.dot(camera.up).abs() < EPS);
        assert!(camera.right.dot(camera.up).abs() < EPS);
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FlyCamera::new(Vector3::new(0.0, 0.0, 3.0));
        assert!((camera.front - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPS);
        assert!((camera.right - Vector3::new(1.0, 0.0, 0.0)).magnitude() < EPS);
        assert_eq!(camera.zoom, ZOOM);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        for _ in 0..50 {
            camera.process_mouse_movement(3.0, 250.0, true);
            assert!(camera.pitch <= PITCH_LIMIT && camera.pitch >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch, PITCH_LIMIT);

        for _ in 0..50 {
            camera.process_mouse_movement(-7.0, -400.0, true);
            assert!(camera.pitch <= PITCH_LIMIT && camera.pitch >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_unconstrained_pitch_is_not_clamped() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(0.0, 1000.0, false);
        assert!((camera.pitch - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = FlyCamera::default();
        for offset in [10.0, 30.0, 7.5, -100.0, 2.0, -3.0, 60.0] {
            camera.process_mouse_scroll(offset);
            assert!(camera.zoom >= ZOOM_MIN && camera.zoom <= ZOOM_MAX);
        }
        camera.process_mouse_scroll(1000.0);
        assert_eq!(camera.zoom, ZOOM_MIN);
        camera.process_mouse_scroll(-1000.0);
        assert_eq!(camera.zoom, ZOOM_MAX);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut camera = FlyCamera::default();
        let moves = [(12.0, 4.0), (-300.0, 80.0), (45.5, -900.0), (0.3, 0.1), (1234.0, 56.0)];
        for (x, y) in moves {
            camera.process_mouse_movement(x, y, true);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn test_keyboard_moves_along_basis() {
        let mut camera = FlyCamera::new(Vector3::zero());
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        assert!((camera.position - Vector3::new(0.0, 0.0, -5.0)).magnitude() < EPS);

        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!((camera.position - Vector3::new(2.5, 0.0, -5.0)).magnitude() < EPS);

        camera.process_keyboard(CameraMovement::Left, 1.0);
        camera.process_keyboard(CameraMovement::Backward, 2.0);
        assert!(camera.position.magnitude() < EPS);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let mut camera = FlyCamera::new(Vector3::new(1.0, 2.0, 3.0));
        camera.process_mouse_movement(120.0, -45.0, true);

        let eye = camera.view_matrix() * camera.position.extend(1.0);
        assert!((eye - Vector4::new(0.0, 0.0, 0.0, 1.0)).magnitude() < 1e-4);

        // A point straight ahead ends up on the negative view Z axis
        let ahead = camera.view_matrix() * (camera.position + camera.front).extend(1.0);
        assert!((ahead - Vector4::new(0.0, 0.0, -1.0, 1.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_restore_orientation_keeps_front() {
        let mut source = FlyCamera::default();
        source.process_mouse_movement(200.0, 150.0, true);

        let mut restored = FlyCamera::default();
        restored.restore_orientation(source.front, Some((source.yaw, source.pitch)));

        assert_eq!(restored.front, source.front);
        assert_eq!(restored.yaw, source.yaw);
        assert_eq!(restored.pitch, source.pitch);
        assert_orthonormal(&restored);
    }

    #[test]
    fn test_restore_orientation_ignores_zero_front() {
        let mut camera = FlyCamera::default();
        camera.restore_orientation(Vector3::zero(), None);
        assert!((camera.front - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPS);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_restore_vertical_front_without_angles() {
        for y in [1.0, -1.0] {
            let mut camera = FlyCamera::default();
            camera.restore_orientation(Vector3::new(0.0, y, 0.0), None);

            assert_eq!(camera.pitch, PITCH_LIMIT * y);
            assert_orthonormal(&camera);
            let view = camera.view_matrix();
            assert!(view.x.x.is_finite() && view.y.y.is_finite() && view.z.z.is_finite());
        }
    }

    #[test]
    fn test_restore_vertical_front_with_angles() {
        let mut camera = FlyCamera::default();
        camera.restore_orientation(Vector3::new(0.0, 1.0, 0.0), Some((30.0, 10.0)));
        assert_eq!((camera.yaw, camera.pitch), (30.0, 10.0));
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_restore_without_angles_recovers_them() {
        let mut source = FlyCamera::default();
        source.process_mouse_movement(-250.0, 300.0, true);

        let mut restored = FlyCamera::default();
        restored.restore_orientation(source.front, None);

        assert!((restored.yaw - source.yaw).abs() < 1e-3);
        assert!((restored.pitch - source.pitch).abs() < 1e-3);
        assert!((restored.front - source.front).magnitude() < 1e-4);
        assert_orthonormal(&restored);
    }

    #[test]
    fn test_spans_basis() {
        assert!(spans_basis(Vector3::new(0.0, 0.0, -1.0), WORLD_UP));
        assert!(spans_basis(Vector3::new(0.0, 5.0, -1.0), WORLD_UP));
        assert!(!spans_basis(Vector3::new(0.0, 2.0, 0.0), WORLD_UP));
        assert!(!spans_basis(Vector3::new(0.0, -1.0, 0.0), WORLD_UP));
        assert!(!spans_basis(Vector3::zero(), WORLD_UP));
    }
}

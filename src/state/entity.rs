//! Per-entity transform state and motion configuration

use cgmath::Vector3;

/// Mutable per-frame transform of a renderable entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    pub position: Vector3<f32>,
    /// Accumulated angle in degrees; drives the orbit offset and/or the spin
    pub rotation_angle: f32,
    pub scale: f32,
}

impl EntityTransform {
    pub fn new(position: Vector3<f32>, scale: f32) -> Self {
        Self {
            position,
            rotation_angle: 0.0,
            scale,
        }
    }
}

/// How an entity moves over time
///
/// `rotation_angle` of the transform feeds two things: the orbit offset (when
/// `orbit_radius` is non-zero) and the rotation about `rotation_axis` (unless
/// `fixed_rotation_deg` pins it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMotion {
    pub orbit_radius: f32,
    pub angular_speed_deg_per_sec: f32,
    /// When false the angle only changes through input or the overlay
    pub angle_is_time_varying: bool,
    pub rotation_axis: Vector3<f32>,
    pub fixed_rotation_deg: Option<f32>,
}

impl EntityMotion {
    /// No orbit, no rotation
    pub fn stationary() -> Self {
        Self {
            orbit_radius: 0.0,
            angular_speed_deg_per_sec: 0.0,
            angle_is_time_varying: false,
            rotation_axis: Vector3::unit_y(),
            fixed_rotation_deg: Some(0.0),
        }
    }

    /// Rotates about `axis` at a constant rate
    pub fn spinning(axis: Vector3<f32>, degrees_per_sec: f32) -> Self {
        Self {
            orbit_radius: 0.0,
            angular_speed_deg_per_sec: degrees_per_sec,
            angle_is_time_varying: true,
            rotation_axis: axis,
            fixed_rotation_deg: None,
        }
    }

    /// Circles its base position at `radius`; the body keeps a fixed tilt
    pub fn orbiting(radius: f32, axis: Vector3<f32>, fixed_rotation_deg: f32) -> Self {
        Self {
            orbit_radius: radius,
            angular_speed_deg_per_sec: 0.0,
            angle_is_time_varying: false,
            rotation_axis: axis,
            fixed_rotation_deg: Some(fixed_rotation_deg),
        }
    }

    pub fn with_time_varying_angle(mut self, degrees_per_sec: f32) -> Self {
        self.angle_is_time_varying = true;
        self.angular_speed_deg_per_sec = degrees_per_sec;
        self
    }

    /// Angle used for the rotation part of the model matrix
    pub fn rotation_deg(&self, transform: &EntityTransform) -> f32 {
        self.fixed_rotation_deg.unwrap_or(transform.rotation_angle)
    }
}

/// A renderable entity: its transform plus its motion rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEntity {
    pub name: &'static str,
    pub transform: EntityTransform,
    pub motion: EntityMotion,
}

impl SceneEntity {
    pub fn new(name: &'static str, transform: EntityTransform, motion: EntityMotion) -> Self {
        Self {
            name,
            transform,
            motion,
        }
    }

    /// Advances the angle by `speed * delta_time` when it is time-varying
    pub fn advance(&mut self, delta_time: f32) {
        if self.motion.angle_is_time_varying {
            self.transform.rotation_angle += self.motion.angular_speed_deg_per_sec * delta_time;
        }
    }
}

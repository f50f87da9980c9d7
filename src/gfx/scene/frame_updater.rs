//! Per-frame state advance and uniform mapping
//!
//! [`FrameUpdater`] is the bridge between [`ProgramState`] and the render
//! engine: it advances time-dependent angles, derives model, view and
//! projection matrices, and packs them with the light parameters into one
//! [`EntityUniforms`] block per draw. Nothing here touches the GPU.

use cgmath::{perspective, Deg, InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use crate::{
    config::{MATERIAL_SHININESS, Z_FAR, Z_NEAR},
    gfx::{
        camera::FlyCamera,
        rendering::shaders::ShaderProgram,
        resources::entity_bindings::{DirectionalLightUniform, EntityUniforms, PointLightUniform},
    },
    state::{ProgramState, SceneEntity},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Which part of the camera transform reaches the shaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Full look-at transform
    #[default]
    Full,
    /// Translation stripped: only the camera orientation applies, so the
    /// scene behaves as if infinitely far away
    RotationOnly,
}

impl ViewMode {
    /// The other mode; bound to the V key
    pub fn toggled(self) -> Self {
        match self {
            Self::Full => Self::RotationOnly,
            Self::RotationOnly => Self::Full,
        }
    }
}

/// Horizontal offset on a circle of `radius` around the base position
pub fn orbit_offset(radius: f32, angle_deg: f32) -> Vector3<f32> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Vector3::new(cos, 0.0, sin) * radius
}

/// `T(position + orbit) * R(angle, axis) * S(scale)`
///
/// Applied to a vertex this scales first, then rotates, then translates.
pub fn model_matrix(entity: &SceneEntity) -> Matrix4<f32> {
    let transform = &entity.transform;
    let motion = &entity.motion;

    let mut translation = transform.position;
    if motion.orbit_radius != 0.0 {
        translation += orbit_offset(motion.orbit_radius, transform.rotation_angle);
    }

    let t = Matrix4::from_translation(translation);
    let r = Matrix4::from_axis_angle(
        motion.rotation_axis.normalize(),
        Deg(motion.rotation_deg(transform)),
    );
    let s = Matrix4::from_scale(transform.scale);
    t * r * s
}

/// Perspective projection in wgpu clip space (depth 0..1)
pub fn projection_matrix(zoom_deg: f32, aspect: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX * perspective(Deg(zoom_deg), aspect, Z_NEAR, Z_FAR)
}

pub fn view_for_draw(camera: &FlyCamera, mode: ViewMode) -> Matrix4<f32> {
    let view = camera.view_matrix();
    match mode {
        ViewMode::Full => view,
        ViewMode::RotationOnly => Matrix4::from(Matrix3::from_cols(
            view.x.truncate(),
            view.y.truncate(),
            view.z.truncate(),
        )),
    }
}

/// Viewport aspect ratio; a zero height (minimized window) counts as 1
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// One draw call worth of data
#[derive(Debug, Clone, Copy)]
pub struct EntityDraw {
    pub name: &'static str,
    pub program: ShaderProgram,
    pub uniforms: EntityUniforms,
}

/// Everything the render engine needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub clear_color: [f32; 3],
    /// Primary, secondary, ground
    pub draws: [EntityDraw; 3],
}

#[derive(Debug, Clone, Copy)]
pub struct FrameUpdater {
    pub view_mode: ViewMode,
    pub shininess: f32,
    pub programs: [ShaderProgram; 3],
}

impl Default for FrameUpdater {
    fn default() -> Self {
        Self::new(ViewMode::default())
    }
}

impl FrameUpdater {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            shininess: MATERIAL_SHININESS,
            programs: [
                ShaderProgram::LitModel,
                ShaderProgram::Sun,
                ShaderProgram::Ground,
            ],
        }
    }

    /// Advances every time-varying entity angle by `delta_time` seconds
    pub fn advance(&self, state: &mut ProgramState, delta_time: f32) {
        let delta_time = delta_time.max(0.0);
        for entity in state.entities_mut() {
            entity.advance(delta_time);
        }
    }

    /// Maps the current state onto the per-draw uniform blocks
    pub fn build(&self, state: &ProgramState, aspect: f32) -> FrameUniforms {
        let camera = &state.camera;
        let view: [[f32; 4]; 4] = view_for_draw(camera, self.view_mode).into();
        let projection: [[f32; 4]; 4] = projection_matrix(camera.zoom, aspect).into();
        let view_position = [camera.position.x, camera.position.y, camera.position.z, 1.0];
        let point_light = PointLightUniform::from(&state.point_light);
        let directional_light = DirectionalLightUniform::from(&state.directional_light);
        let material = [self.shininess, 0.0, 0.0, 0.0];

        let draw = |entity: &SceneEntity, program: ShaderProgram| {
            let model = model_matrix(entity);
            let normal = model.invert().map(|m| m.transpose()).unwrap_or(model);
            EntityDraw {
                name: entity.name,
                program,
                uniforms: EntityUniforms {
                    model: model.into(),
                    normal: normal.into(),
                    view,
                    projection,
                    view_position,
                    point_light,
                    directional_light,
                    material,
                },
            }
        };

        let [primary, secondary, ground] = state.entities();
        FrameUniforms {
            clear_color: state.clear_color,
            draws: [
                draw(primary, self.programs[0]),
                draw(secondary, self.programs[1]),
                draw(ground, self.programs[2]),
            ],
        }
    }
}

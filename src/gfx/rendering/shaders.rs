//! WGSL shader programs
//!
//! Each entity is drawn with one named program. All programs share the
//! `EntityUniforms` block at group 0 and the material group at group 1: the
//! colour block, the diffuse and specular maps and their sampler.

pub const MODEL_LIGHTING_SHADER: &str = include_str!("shaders/model_lighting.wgsl");
pub const SUN_SHADER: &str = include_str!("shaders/sun.wgsl");
pub const GROUND_SHADER: &str = include_str!("shaders/ground.wgsl");

/// Shader program an entity is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Point-lit textured model
    LitModel,
    /// Self-lit body with a point-light rim
    Sun,
    /// Terrain lit by the directional light
    Ground,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 3] = [Self::LitModel, Self::Sun, Self::Ground];

    /// Name used for both the shader module and its pipeline
    pub fn name(self) -> &'static str {
        match self {
            Self::LitModel => "model_lighting",
            Self::Sun => "sun",
            Self::Ground => "ground",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Self::LitModel => MODEL_LIGHTING_SHADER,
            Self::Sun => SUN_SHADER,
            Self::Ground => GROUND_SHADER,
        }
    }
}

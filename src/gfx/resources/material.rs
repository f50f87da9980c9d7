//! Surface materials
//!
//! Materials come from the MTL file next to a model: the diffuse and specular
//! colours plus their `map_Kd`/`map_Ks` images. The shaders multiply each
//! colour with its map, and a missing map is bound as 1x1 white. The specular
//! exponent is a scene-wide constant pushed with the entity uniforms.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::texture_resource::{TextureImage, TextureResource};
use crate::wgpu_utils::{binding_types, uniform_buffer::UniformBuffer};

/// GPU block, MUST match `Material` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// RGB plus alpha from the MTL dissolve term
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub alpha: f32,
    pub diffuse_map: Option<TextureImage>,
    pub specular_map: Option<TextureImage>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.5, 0.5, 0.5],
            alpha: 1.0,
            diffuse_map: None,
            specular_map: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, diffuse: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            diffuse,
            ..Self::default()
        }
    }

    /// Builds a material from a parsed MTL entry, keeping defaults for
    /// missing terms
    ///
    /// Map file names are resolved against `base_dir`, the folder of the OBJ
    /// file. A map that fails to load is logged and left out.
    pub fn from_mtl(mtl: &tobj::Material, index: usize, base_dir: &Path) -> Self {
        let default = Self::default();
        let load = |name: &Option<String>| map_path(base_dir, name.as_deref()).and_then(|p| load_map(&p));
        Self {
            name: if mtl.name.is_empty() {
                format!("material_{}", index)
            } else {
                mtl.name.clone()
            },
            diffuse: mtl.diffuse.unwrap_or(default.diffuse),
            specular: mtl.specular.unwrap_or(default.specular),
            alpha: mtl.dissolve.unwrap_or(default.alpha).clamp(0.0, 1.0),
            diffuse_map: load(&mtl.diffuse_texture),
            specular_map: load(&mtl.specular_texture),
        }
    }

    pub fn with_specular(mut self, specular: [f32; 3]) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_specular_map(mut self, map: TextureImage) -> Self {
        self.specular_map = Some(map);
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        let [r, g, b] = self.diffuse;
        let [sr, sg, sb] = self.specular;
        MaterialUniform {
            diffuse: [r, g, b, self.alpha],
            specular: [sr, sg, sb, 0.0],
        }
    }
}

/// Map file named by an MTL entry, relative to the OBJ folder
pub fn map_path(base_dir: &Path, name: Option<&str>) -> Option<PathBuf> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| base_dir.join(n))
}

fn load_map(path: &Path) -> Option<TextureImage> {
    match TextureImage::load(path) {
        Ok(image) => {
            debug!("loaded map {} ({}x{})", path.display(), image.width, image.height);
            Some(image)
        }
        Err(err) => {
            warn!("{}; using white", err);
            None
        }
    }
}

/// Colour block, both maps and their sampler for one material, bound at
/// group 1
pub struct MaterialBindings {
    _ubo: MaterialUBO,
    _diffuse: TextureResource,
    _specular: TextureResource,
    bind_group: wgpu::BindGroup,
}

impl MaterialBindings {
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let fragment = |binding, ty| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty,
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                fragment(0, binding_types::uniform()),
                fragment(1, binding_types::texture_2d()),
                fragment(2, binding_types::texture_2d()),
                fragment(3, binding_types::sampler(wgpu::SamplerBindingType::Filtering)),
            ],
        })
    }

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        material: &Material,
    ) -> Self {
        let ubo = MaterialUBO::new_with_data(device, &material.uniform());

        let white = TextureImage::white();
        let upload = |map: &Option<TextureImage>, kind: &str| {
            TextureResource::from_image(
                device,
                queue,
                map.as_ref().unwrap_or(&white),
                &format!("{} {} map", material.name, kind),
            )
        };
        let diffuse = upload(&material.diffuse_map, "diffuse");
        let specular = upload(&material.specular_map, "specular");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", material.name)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material Bind Group: {}", material.name)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            _ubo: ubo,
            _diffuse: diffuse,
            _specular: specular,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_packing() {
        let material = Material::new("moon", [0.9, 0.85, 0.6]).with_specular([0.1, 0.2, 0.3]);
        let uniform = material.uniform();
        assert_eq!(uniform.diffuse, [0.9, 0.85, 0.6, 1.0]);
        assert_eq!(uniform.specular, [0.1, 0.2, 0.3, 0.0]);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_from_mtl_fills_missing_terms() {
        let mtl = tobj::Material {
            diffuse: Some([0.2, 0.4, 0.6]),
            dissolve: Some(1.5),
            ..Default::default()
        };
        let material = Material::from_mtl(&mtl, 3, Path::new("."));
        assert_eq!(material.name, "material_3");
        assert_eq!(material.diffuse, [0.2, 0.4, 0.6]);
        assert_eq!(material.specular, Material::default().specular);
        assert_eq!(material.alpha, 1.0);
        assert!(material.diffuse_map.is_none());
        assert!(material.specular_map.is_none());
    }

    #[test]
    fn test_map_path_resolves_against_obj_folder() {
        let base = Path::new("resources/objects/ground");
        assert_eq!(
            map_path(base, Some("specular.png")),
            Some(base.join("specular.png"))
        );
        assert_eq!(map_path(base, Some("  ")), None);
        assert_eq!(map_path(base, None), None);
    }

    #[test]
    fn test_from_mtl_loads_maps() {
        let dir = std::env::temp_dir().join(format!("moonlit-material-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(dir.join("albedo.png"))
            .unwrap();

        let mtl = tobj::Material {
            name: "cat".to_string(),
            diffuse_texture: Some("albedo.png".to_string()),
            specular_texture: Some("missing.png".to_string()),
            ..Default::default()
        };
        let material = Material::from_mtl(&mtl, 0, &dir);

        let diffuse = material.diffuse_map.as_ref().unwrap();
        assert_eq!((diffuse.width, diffuse.height), (4, 2));
        assert_eq!(&diffuse.pixels[0..4], &[10, 20, 30, 255]);
        // Unreadable maps fall back to white at bind time
        assert!(material.specular_map.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_with_specular_map() {
        let material = Material::new("ground", [0.5, 0.5, 0.5]).with_specular_map(TextureImage::white());
        assert_eq!(material.specular_map, Some(TextureImage::white()));
        assert!(material.diffuse_map.is_none());
    }
}

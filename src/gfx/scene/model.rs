//! Renderable models
//!
//! A [`Model`] is a list of meshes plus the materials they reference. Models
//! are loaded from OBJ/MTL files through `tobj`, or built from procedural
//! geometry when a file is missing. Texture maps named in the MTL file are
//! looked up next to the OBJ file.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::gfx::{
    geometry::GeometryData,
    resources::{
        material::{Material, MaterialBindings},
        texture_resource::TextureImage,
    },
};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {path} contains no triangles")]
    Empty { path: PathBuf },
}

struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

pub struct Mesh {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Index into the owning model's materials
    pub material: Option<usize>,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>, material: Option<usize>) -> Self {
        Self {
            vertices,
            indices,
            material,
            buffers: None,
        }
    }

    /// Interleaves a `tobj` mesh, filling in normals when the file has none
    pub fn from_tobj(mesh: &tobj::Mesh) -> Self {
        let vertex_count = mesh.positions.len() / 3;
        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.clone()
        } else {
            debug!("mesh has no usable normals, averaging face normals");
            Self::calculate_vertex_normals(&mesh.positions, &mesh.indices)
        };
        let has_uvs = mesh.texcoords.len() == vertex_count * 2;

        let vertices = (0..vertex_count)
            .map(|i| Vertex3D {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                tex_coords: if has_uvs {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();

        Self::new(vertices, mesh.indices.clone(), mesh.material_id)
    }

    /// Area-weighted average of the adjacent face normals per vertex
    pub fn calculate_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let mut normals = vec![0.0f32; positions.len()];
        let vertex = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (v0, v1, v2) = (vertex(i0), vertex(i1), vertex(i2));

            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            for idx in [i0, i1, i2] {
                for axis in 0..3 {
                    normals[idx * 3 + axis] += face_normal[axis];
                }
            }
        }

        for n in normals.chunks_exact_mut(3) {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if length > 0.0 {
                n.iter_mut().for_each(|c| *c /= length);
            }
        }

        normals
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn upload(&mut self, device: &wgpu::Device, label: &str) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.buffers = Some(MeshBuffers {
            vertex_buffer,
            index_buffer,
        });
    }
}

pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    fallback_material: Material,
    material_bindings: Vec<MaterialBindings>,
    fallback_bindings: Option<MaterialBindings>,
}

impl Model {
    fn new(name: String, meshes: Vec<Mesh>, materials: Vec<Material>, fallback: Material) -> Self {
        Self {
            name,
            meshes,
            materials,
            fallback_material: fallback,
            material_bindings: Vec::new(),
            fallback_bindings: None,
        }
    }

    /// Loads an OBJ file and the materials of its MTL library
    ///
    /// A missing or broken MTL file is not an error; affected meshes are drawn
    /// with `fallback`.
    pub fn load(path: &Path, fallback: Material) -> Result<Self, ModelError> {
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| ModelError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let materials = match materials {
            Ok(materials) => materials
                .iter()
                .enumerate()
                .map(|(i, mtl)| Material::from_mtl(mtl, i, base_dir))
                .collect(),
            Err(err) => {
                warn!("{}: no usable MTL library ({}), using default material", path.display(), err);
                Vec::new()
            }
        };

        let meshes: Vec<Mesh> = models
            .iter()
            .filter(|m| !m.mesh.indices.is_empty())
            .map(|m| Mesh::from_tobj(&m.mesh))
            .collect();
        if meshes.is_empty() {
            return Err(ModelError::Empty {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        debug!(
            "loaded {}: {} meshes, {} materials",
            path.display(),
            meshes.len(),
            materials.len()
        );

        Ok(Self::new(name, meshes, materials, fallback))
    }

    /// Single-mesh model from procedural geometry
    pub fn from_geometry(name: &str, geometry: &GeometryData, material: Material) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(
            name.to_string(),
            vec![Mesh::new(vertices, indices, None)],
            Vec::new(),
            material,
        )
    }

    /// Loads `path`, or builds the stand-in shape if that fails
    pub fn load_or_else<F>(path: &Path, fallback: Material, stand_in: F) -> Self
    where
        F: FnOnce() -> GeometryData,
    {
        match Self::load(path, fallback.clone()) {
            Ok(model) => model,
            Err(err) => {
                warn!("{}; drawing a procedural stand-in", err);
                let name = fallback.name.clone();
                Self::from_geometry(&name, &stand_in(), fallback)
            }
        }
    }

    /// Uses `map` as the specular map of every material, including the fallback
    pub fn with_specular_map(mut self, map: TextureImage) -> Self {
        for material in self.materials.iter_mut() {
            material.specular_map = Some(map.clone());
        }
        self.fallback_material.specular_map = Some(map);
        self
    }

    /// Material a mesh is drawn with
    pub fn material_for(&self, mesh: &Mesh) -> &Material {
        mesh.material
            .and_then(|i| self.materials.get(i))
            .unwrap_or(&self.fallback_material)
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count() / 3).sum()
    }

    /// Creates vertex, index and material buffers and uploads material maps
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_layout: &wgpu::BindGroupLayout,
    ) {
        for mesh in self.meshes.iter_mut() {
            mesh.upload(device, &self.name);
        }
        self.material_bindings = self
            .materials
            .iter()
            .map(|m| MaterialBindings::new(device, queue, material_layout, m))
            .collect();
        self.fallback_bindings = Some(MaterialBindings::new(
            device,
            queue,
            material_layout,
            &self.fallback_material,
        ));
    }

    fn bindings_for(&self, mesh: &Mesh) -> Option<&MaterialBindings> {
        mesh.material
            .and_then(|i| self.material_bindings.get(i))
            .or(self.fallback_bindings.as_ref())
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    /// Draws every mesh with its material bound at group 1
    fn draw_model(&mut self, model: &'a Model);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        // Not uploaded yet
        let Some(buffers) = &mesh.buffers else {
            return;
        };

        self.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        self.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, instances);
    }

    fn draw_model(&mut self, model: &'b Model) {
        for mesh in &model.meshes {
            let Some(bindings) = model.bindings_for(mesh) else {
                continue;
            };
            self.set_bind_group(1, bindings.bind_group(), &[]);
            self.draw_mesh(mesh, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("moonlit-model-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_vertex_normals_of_flat_quad() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, -1.0];
        let indices = [0, 1, 2, 2, 3, 0];
        let normals = Mesh::calculate_vertex_normals(&positions, &indices);
        for n in normals.chunks(3) {
            assert!((n[1] - 1.0).abs() < 1e-6, "{:?}", n);
        }
    }

    #[test]
    fn test_load_obj_with_material() {
        let dir = scratch_dir("mtl");
        fs::write(
            dir.join("tri.mtl"),
            "newmtl glow\nKd 1.0 0.5 0.25\nKs 0.1 0.1 0.1\nNs 10\n",
        )
        .unwrap();
        fs::write(
            dir.join("tri.obj"),
            "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl glow\nf 1 2 3\n",
        )
        .unwrap();

        let model = Model::load(&dir.join("tri.obj"), Material::default()).unwrap();
        assert_eq!(model.name, "tri");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 1);

        let mesh = &model.meshes[0];
        let material = model.material_for(mesh);
        assert_eq!(material.name, "glow");
        assert_eq!(material.diffuse, [1.0, 0.5, 0.25]);
        // No vn lines, so normals are derived: +Z for a CCW triangle in XY
        assert!((mesh.vertices[0].normal[2] - 1.0).abs() < 1e-6);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mtl_maps_resolve_next_to_obj() {
        let dir = scratch_dir("maps");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]))
            .save(dir.join("fur.png"))
            .unwrap();
        fs::write(dir.join("tri.mtl"), "newmtl fur\nKd 1 1 1\nmap_Kd fur.png\n").unwrap();
        fs::write(
            dir.join("tri.obj"),
            "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nusemtl fur\nf 1/1 2/2 3/3\n",
        )
        .unwrap();

        let model = Model::load(&dir.join("tri.obj"), Material::default()).unwrap();
        let material = model.material_for(&model.meshes[0]);
        let map = material.diffuse_map.as_ref().unwrap();
        assert_eq!(&map.pixels[0..4], &[200, 100, 50, 255]);
        assert!(material.specular_map.is_none());
        assert_eq!(model.meshes[0].vertices[1].tex_coords, [1.0, 0.0]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_specular_map_override_covers_fallback() {
        let model = Model::from_geometry("ground", &generate_cube(), Material::default())
            .with_specular_map(TextureImage::white());
        let material = model.material_for(&model.meshes[0]);
        assert_eq!(material.specular_map, Some(TextureImage::white()));
    }

    #[test]
    fn test_missing_mtl_uses_fallback_material() {
        let dir = scratch_dir("nomtl");
        fs::write(
            dir.join("tri.obj"),
            "mtllib absent.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let fallback = Material::new("stand-in", [0.3, 0.3, 0.3]);
        let model = Model::load(&dir.join("tri.obj"), fallback).unwrap();
        assert_eq!(model.material_for(&model.meshes[0]).name, "stand-in");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Model::load(Path::new("/definitely/not/here.obj"), Material::default());
        assert!(matches!(result, Err(ModelError::Load { .. })));
    }

    #[test]
    fn test_load_or_else_builds_stand_in() {
        let model = Model::load_or_else(
            Path::new("/definitely/not/here.obj"),
            Material::new("primary", [1.0, 1.0, 1.0]),
            generate_cube,
        );
        assert_eq!(model.name, "primary");
        assert_eq!(model.triangle_count(), 12);
        assert_eq!(model.material_for(&model.meshes[0]).name, "primary");
    }
}

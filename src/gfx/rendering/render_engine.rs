//! WGPU-based rendering engine
//!
//! Owns the surface, device and queue, one pipeline per [`ShaderProgram`], a
//! uniform block per scene entity and the depth buffer. A frame is a single
//! depth-tested pass over the three entities followed by an optional UI pass.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use log::{debug, info};
use wgpu::TextureFormat;

use crate::gfx::{
    resources::{
        entity_bindings::EntityBindings, material::MaterialBindings,
        texture_resource::TextureResource,
    },
    scene::{
        frame_updater::FrameUniforms,
        model::{DrawModel, Model},
    },
};

use super::{
    pipeline_manager::{PipelineConfig, PipelineManager},
    shaders::ShaderProgram,
};

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    material_layout: wgpu::BindGroupLayout,
    /// One block per drawn entity, in draw order
    entity_bindings: Vec<EntityBindings>,
}

impl RenderEngine {
    /// Creates the GPU context for `window` and builds every pipeline
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a device")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let present_mode = if !vsync
            && surface_capabilities
                .present_modes
                .contains(&wgpu::PresentMode::Immediate)
        {
            wgpu::PresentMode::Immediate
        } else {
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        debug!("surface configured: {:?} {:?}", format, present_mode);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let entity_layout = EntityBindings::create_layout(&device);
        let material_layout = MaterialBindings::create_layout(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        for program in ShaderProgram::ALL {
            pipeline_manager.load_shader(program.name(), program.source());
            pipeline_manager.register_pipeline(
                program.name(),
                PipelineConfig::default_with_shader(program.name())
                    .with_bind_group_layouts(vec![entity_layout.clone(), material_layout.clone()])
                    .with_depth_format(TextureResource::DEPTH_FORMAT)
                    .with_alpha_blended_target(format),
            );
        }
        pipeline_manager.create_all_pipelines()?;

        let entity_bindings = ["Primary", "Secondary", "Ground"]
            .iter()
            .map(|label| EntityBindings::new(&device, &entity_layout, label))
            .collect();

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            material_layout,
            entity_bindings,
        })
    }

    /// Uploads a model's buffers, materials and texture maps
    pub fn upload_model(&self, model: &mut Model) {
        model.upload(&self.device, &self.queue, &self.material_layout);
    }

    /// Renders one frame
    ///
    /// `models` pairs up with `frame.draws`. The UI callback runs after the
    /// scene pass against the same surface texture.
    pub fn render_frame<F>(
        &mut self,
        frame: &FrameUniforms,
        models: [&Model; 3],
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        for (bindings, draw) in self.entity_bindings.iter_mut().zip(frame.draws.iter()) {
            bindings.update(&self.queue, draw.uniforms);
        }

        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = frame.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for ((draw, bindings), model) in frame
                .draws
                .iter()
                .zip(self.entity_bindings.iter())
                .zip(models)
            {
                let Ok(pipeline) = self.pipeline_manager.pipeline(draw.program.name()) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, bindings.bind_group(), &[]);
                render_pass.draw_model(model);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reapplies the current configuration after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }
}

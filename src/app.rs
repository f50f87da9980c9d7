use std::{sync::Arc, time::Instant};

use anyhow::Context;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::{ModelPaths, ViewerConfig},
    gfx::{
        camera::CameraController,
        geometry::{generate_cube, generate_plane, generate_sphere},
        rendering::RenderEngine,
        resources::{material::Material, texture_resource::TextureImage},
        scene::{frame_updater::aspect_ratio, FrameUpdater, Model},
    },
    state::{settings, CursorMode, LoadOutcome, ProgramState},
    ui::{draw_overlay, UiManager},
};

/// The viewer: an event loop plus everything it drives
pub struct MoonlitApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    program: ProgramState,
    controller: CameraController,
    frame_updater: FrameUpdater,
    /// Primary, secondary, ground
    models: [Model; 3],
    /// R is down; the primary entity drifts every frame
    drift_held: bool,
    /// Raw mouse motion is reported even while another window has focus
    focused: bool,
    last_frame: Instant,
    init_error: Option<anyhow::Error>,
}

impl MoonlitApp {
    /// Creates the event loop, restores persisted settings and loads models
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let mut program = ProgramState::default();
        restore_settings(&mut program, &config);

        let models = load_models(&config.models);

        Ok(Self {
            event_loop,
            app_state: AppState {
                frame_updater: FrameUpdater::new(config.view_mode),
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                program,
                controller: CameraController::new(),
                models,
                drift_held: false,
                focused: true,
                last_frame: Instant::now(),
                init_error: None,
            },
        })
    }

    /// Runs until the window closes; settings are saved on the way out
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        match self.app_state.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn restore_settings(program: &mut ProgramState, config: &ViewerConfig) {
    match settings::load_or_migrate(
        program,
        &config.settings_path,
        &config.legacy_settings_path,
    ) {
        Ok(LoadOutcome::Loaded) => {
            info!("restored settings from {}", config.settings_path.display())
        }
        Ok(LoadOutcome::MigratedLegacy) => info!(
            "migrated legacy settings from {}",
            config.legacy_settings_path.display()
        ),
        Ok(LoadOutcome::NotFound) => info!("no saved settings, starting from defaults"),
        Err(err) => {
            warn!("ignoring saved settings: {}", err);
            *program = ProgramState::default();
        }
    }
    program.sync_overlay_flags();
}

fn load_models(paths: &ModelPaths) -> [Model; 3] {
    let ground = Model::load_or_else(
        &paths.ground,
        Material::new("ground", [0.35, 0.45, 0.25]).with_specular([0.1, 0.1, 0.1]),
        || generate_plane(10.0, 10.0, 8, 8),
    );
    let ground = match TextureImage::load(&paths.ground_specular_map) {
        Ok(map) => ground.with_specular_map(map),
        Err(err) => {
            warn!("{}; ground keeps its own specular maps", err);
            ground
        }
    };

    [
        Model::load_or_else(
            &paths.primary,
            Material::new("primary", [0.85, 0.85, 0.85]),
            || generate_cube().scaled(20.0),
        ),
        Model::load_or_else(
            &paths.secondary,
            Material::new("secondary", [1.0, 0.95, 0.8]),
            || generate_sphere(32, 16).scaled(10.0),
        ),
        ground,
    ]
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let PhysicalSize { width, height } = window.inner_size();
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))?;

        for model in self.models.iter_mut() {
            render_engine.upload_model(model);
        }

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);
        self.apply_cursor_mode(self.program.cursor_mode());
        self.last_frame = Instant::now();
        Ok(())
    }

    fn apply_cursor_mode(&mut self, mode: CursorMode) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        match mode {
            CursorMode::Captured => {
                let grabbed = window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
                if let Err(err) = grabbed {
                    warn!("could not capture cursor: {}", err);
                }
                window.set_cursor_visible(false);
            }
            CursorMode::Free => {
                if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                    warn!("could not release cursor: {}", err);
                }
                window.set_cursor_visible(true);
            }
        }
    }

    /// Handles keys that work regardless of the overlay; returns true if used
    fn handle_global_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let pressed = event.state == ElementState::Pressed;

        match code {
            KeyCode::Escape if pressed => event_loop.exit(),
            KeyCode::F1 if pressed && !event.repeat => {
                let mode = self.program.toggle_overlay();
                info!(
                    "overlay {}",
                    if self.program.gui_enabled { "shown" } else { "hidden" }
                );
                self.apply_cursor_mode(mode);
            }
            KeyCode::Escape | KeyCode::F1 => {}
            _ => return false,
        }
        true
    }

    fn handle_scene_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        if self.controller.process_key(code, event.state) {
            return;
        }

        match code {
            KeyCode::KeyR => {
                self.drift_held = event.state == ElementState::Pressed;
                if self.drift_held {
                    self.program.step_primary_orbit();
                }
            }
            KeyCode::KeyV if event.state == ElementState::Pressed && !event.repeat => {
                let mode = self.frame_updater.view_mode.toggled();
                self.frame_updater.view_mode = mode;
                info!("view mode {:?}", mode);
            }
            _ => (),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let Self {
            window,
            render_engine,
            ui_manager,
            program,
            controller,
            frame_updater,
            models,
            drift_held,
            ..
        } = self;
        let (Some(window), Some(render_engine)) = (window.as_ref(), render_engine.as_mut()) else {
            return;
        };

        controller.update_camera(&mut program.camera, delta_time);
        if *drift_held {
            program.drift_primary(delta_time);
        }
        frame_updater.advance(program, delta_time);

        let (width, height) = render_engine.get_surface_size();
        let frame = frame_updater.build(program, aspect_ratio(width, height));

        let gui_enabled = program.gui_enabled;
        let overlay = ui_manager
            .as_mut()
            .filter(|_| gui_enabled)
            .map(|ui_manager| {
                move |device: &wgpu::Device,
                      queue: &wgpu::Queue,
                      encoder: &mut wgpu::CommandEncoder,
                      view: &wgpu::TextureView| {
                    ui_manager.draw(device, queue, encoder, window, view, |ui| {
                        draw_overlay(ui, program)
                    });
                }
            });

        let [primary, secondary, ground] = &*models;
        match render_engine.render_frame(&frame, [primary, secondary, ground], overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(err) => warn!("dropped frame: {}", err),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            error!("initialization failed: {:#}", err);
            self.init_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let WindowEvent::KeyboardInput { event: key, .. } = &event {
            if self.handle_global_key(event_loop, key) {
                return;
            }
        }

        // Input imgui wants stays with imgui while the overlay is open
        let ui_captured = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                ui_manager.handle_input(&window, &ui_event) && self.program.gui_enabled
            }
            None => false,
        };

        match event {
            // Releases always get through so no key stays held
            WindowEvent::KeyboardInput { event: key, .. }
                if !ui_captured || key.state == ElementState::Released =>
            {
                self.handle_scene_key(&key);
            }
            WindowEvent::MouseWheel { delta, .. } if !ui_captured => {
                self.controller
                    .process_scroll(&delta, &mut self.program.camera);
            }
            WindowEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    self.controller.release_all();
                    self.drift_held = false;
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if !self.focused || self.window.is_none() {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            let enabled = self.program.mouse_look_active();
            self.controller
                .process_mouse_motion(delta, &mut self.program.camera, enabled);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.init_error.is_some() {
            return;
        }
        match settings::save(&self.program, &self.config.settings_path) {
            Ok(()) => info!("saved settings to {}", self.config.settings_path.display()),
            Err(err) => error!("failed to save settings: {}", err),
        }
    }
}

//! Main application

use dd_core::{
    Cadence, Camera, HostEvent, HostEvents, Installation, RenderState, SharedCamera, TickContext,
};
use dd_renderer::BatchSurface;

use crate::config::SharedConfig;
use crate::demo::{Demo, scene_geometry};
use crate::orbit::OrbitCamera;
use crate::viewport::{EguiMeasure, LabelLayer, Viewport};

/// Fixed steps run per frame before the backlog is dropped.
const MAX_FIXED_STEPS: usize = 5;

/// Demo host application
pub struct DebugDrawApp {
    state: RenderState,
    events: HostEvents<RenderState>,
    _installation: Option<Installation>,
    camera: SharedCamera,
    orbit: OrbitCamera,
    viewport: Option<Viewport>,
    config: SharedConfig,
    demo: Demo,
    playing: bool,
    accumulator: f32,
    frame_labels: LabelLayer,
    fixed_labels: LabelLayer,
    show_settings: bool,
}

impl DebugDrawApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: SharedConfig) -> Self {
        let (settings, start_playing, scene) = {
            let config = config.read();
            let config = config.config();
            (
                config.debug_draw.clone(),
                config.viewer.start_playing,
                config.viewer.scene,
            )
        };

        let mut state = RenderState::new(settings);
        let events = HostEvents::new();
        let installation = dd_core::install(&mut state, &events)
            .map_err(|e| tracing::error!("Failed to install debug-draw handlers: {}", e))
            .ok();

        let camera = Camera::default().into_shared();
        state.set_text_camera(&camera);

        let viewport = match &cc.wgpu_render_state {
            Some(render_state) => {
                let (lines, triangles) = scene_geometry();
                Some(Viewport::new(
                    render_state.device.clone(),
                    render_state.queue.clone(),
                    render_state.target_format,
                    &lines,
                    &triangles,
                ))
            }
            None => {
                tracing::warn!("No wgpu render state; the viewport will stay empty");
                None
            }
        };

        let mut app = Self {
            state,
            events,
            _installation: installation,
            camera,
            orbit: OrbitCamera::default(),
            viewport,
            config,
            demo: Demo::new(scene),
            playing: false,
            accumulator: 0.0,
            frame_labels: LabelLayer::default(),
            fixed_labels: LabelLayer::default(),
            show_settings: false,
        };
        if start_playing {
            app.set_playing(true);
        }
        app
    }

    fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        let mut event = if playing {
            HostEvent::PlayModeEntered
        } else {
            HostEvent::PlayModeExiting
        };
        self.events.emit(&mut self.state, &mut event);
        tracing::info!("{} play mode", if playing { "Entering" } else { "Leaving" });

        self.playing = playing;
        self.accumulator = 0.0;
        self.frame_labels.clear();
        self.fixed_labels.clear();
    }

    fn reload_scene(&mut self) {
        self.events
            .emit(&mut self.state, &mut HostEvent::SceneOpening);
        self.demo.reset();
        self.frame_labels.clear();
        self.fixed_labels.clear();
        tracing::info!("Scene reloaded");
    }

    /// Runs the fixed-rate callers and flushes the fixed text cadence.
    fn run_fixed_ticks(&mut self, ctx: &egui::Context, dt: f32, step: f32, overlays: bool) {
        self.accumulator += dt;
        let measure = EguiMeasure::new(ctx);
        let mut steps = 0;

        while self.accumulator >= step && steps < MAX_FIXED_STEPS {
            let demo = &mut self.demo;
            self.state
                .with_cadence(Cadence::Fixed, |state| demo.fixed_update(step, state));

            self.fixed_labels.clear();
            self.events.emit(
                &mut self.state,
                &mut HostEvent::Tick {
                    cadence: Cadence::Fixed,
                    context: TickContext {
                        simulating: true,
                        overlays_visible: overlays,
                        measure: &measure,
                        painter: &mut self.fixed_labels,
                    },
                },
            );

            self.accumulator -= step;
            steps += 1;
        }

        if steps == MAX_FIXED_STEPS && self.accumulator >= step {
            tracing::debug!("Dropping {:.3}s of fixed-step backlog", self.accumulator);
            self.accumulator = 0.0;
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = if self.playing { "Stop" } else { "Play" };
                if ui.button(label).clicked() {
                    self.set_playing(!self.playing);
                }
                if ui.button("Reload scene").clicked() {
                    self.reload_scene();
                }

                ui.separator();

                let mut show_overlays = self.config.read().config().viewer.show_overlays;
                if ui.checkbox(&mut show_overlays, "Overlays").changed() {
                    self.config.write().config_mut().viewer.show_overlays = show_overlays;
                }
                ui.toggle_value(&mut self.show_settings, "Settings");
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        let stats = self.state.last_stats();
        let text = self.state.last_text_stats();
        let batches = self.viewport.as_ref().map_or(0, Viewport::batch_count);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(if self.playing { "Playing" } else { "Editing" });
                ui.separator();
                ui.label(format!("{:?}", self.state.lifecycle().state()));
                ui.separator();
                ui.label(format!(
                    "jobs {}  passes {}  batches {} (gpu {})  vertices {}  skipped {}",
                    stats.jobs, stats.passes, stats.batches, batches, stats.vertices, stats.skipped
                ));
                ui.separator();
                ui.label(format!(
                    "labels {} (culled {})",
                    self.frame_labels.len() + self.fixed_labels.len(),
                    text.culled
                ));
                if !self.playing {
                    ui.separator();
                    ui.weak("labels are drawn while playing");
                }
            });
        });
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        egui::Window::new("Debug draw settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                let mut settings = self.state.settings().clone();
                let mut changed = false;

                changed |= ui
                    .add(egui::Slider::new(&mut settings.transparency, 0.0..=1.0).text("Transparency"))
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.occluded_attenuation, 0.0..=1.0)
                            .text("Occluded alpha"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.sizes.dash_length, 0.01..=1.0)
                            .text("Dash length"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.sizes.point_size, 0.01..=1.0)
                            .text("Point size"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.segments.circle, 3..=128)
                            .text("Circle segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut settings.segments.sphere, 3..=128)
                            .text("Sphere segments"),
                    )
                    .changed();

                if changed {
                    match self.state.set_settings(settings.clone()) {
                        Ok(()) => self.config.write().config_mut().debug_draw = settings,
                        Err(e) => tracing::warn!("Rejected settings: {}", e),
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked()
                        && let Err(e) = self.config.write().save()
                    {
                        tracing::error!("Failed to save config: {}", e);
                    }
                    if ui.button("Reset").clicked() {
                        let mut config = self.config.write();
                        config.reset_to_defaults();
                        if let Err(e) = self.state.set_settings(config.config().debug_draw.clone()) {
                            tracing::warn!("Default settings rejected: {}", e);
                        }
                    }
                });
                ui.weak(format!(
                    "{}",
                    self.config.read().config_file_path().display()
                ));
            });
        self.show_settings = open;
    }

    fn viewport_panel(&mut self, ctx: &egui::Context, frame: &eframe::Frame) {
        let (overlays, background, orbit_speed, zoom_speed) = {
            let config = self.config.read();
            let viewer = &config.config().viewer;
            (
                viewer.show_overlays,
                viewer.background,
                viewer.orbit_sensitivity,
                viewer.zoom_sensitivity,
            )
        };

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let size = ui.available_size();
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

                if response.dragged() {
                    let delta = response.drag_delta();
                    self.orbit
                        .orbit(-delta.x * orbit_speed, delta.y * orbit_speed);
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll != 0.0 {
                        self.orbit.zoom((-scroll * zoom_speed).exp());
                    }
                }

                // Labels are laid out in points, the texture in pixels
                let camera = {
                    let mut camera = self.camera.write();
                    self.orbit.apply(&mut camera);
                    camera.set_viewport(rect.width(), rect.height());
                    camera.clone()
                };

                match (&mut self.viewport, frame.wgpu_render_state()) {
                    (Some(viewport), Some(render_state)) => {
                        let ppp = ctx.pixels_per_point();
                        let texture_id = {
                            let mut renderer = render_state.renderer.write();
                            viewport.ensure_texture(
                                (rect.width() * ppp) as u32,
                                (rect.height() * ppp) as u32,
                                &mut renderer,
                            )
                        };
                        viewport.render(&self.events, &mut self.state, &camera, background);
                        ui.painter().image(
                            texture_id,
                            rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    _ => {
                        // Nothing to draw into; the drain still clears the queue
                        self.events.emit(
                            &mut self.state,
                            &mut HostEvent::Repaint {
                                camera: None,
                                surface: &mut BatchSurface::new(),
                            },
                        );
                    }
                }

                self.frame_labels.clear();
                let measure = EguiMeasure::new(ctx);
                self.events.emit(
                    &mut self.state,
                    &mut HostEvent::Tick {
                        cadence: Cadence::Frame,
                        context: TickContext {
                            simulating: self.playing,
                            overlays_visible: overlays,
                            measure: &measure,
                            painter: &mut self.frame_labels,
                        },
                    },
                );

                if overlays {
                    let painter = ui.painter_at(rect);
                    self.fixed_labels.draw(&painter, rect.min);
                    self.frame_labels.draw(&painter, rect.min);
                }
            });
    }
}

impl eframe::App for DebugDrawApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        let (step, overlays) = {
            let config = self.config.read();
            (
                config.config().fixed_step(),
                config.config().viewer.show_overlays,
            )
        };

        if self.playing {
            self.run_fixed_ticks(ctx, dt, step, overlays);
        }
        self.demo.update(dt, self.playing, &mut self.state);

        self.toolbar(ctx);
        self.status_bar(ctx);
        self.settings_window(ctx);
        self.viewport_panel(ctx, frame);

        ctx.request_repaint();
    }
}

impl Drop for DebugDrawApp {
    fn drop(&mut self) {
        if self.state.is_attached() {
            tracing::debug!("Detaching debug-draw pipeline from host events");
            self.state.detach();
        }
    }
}

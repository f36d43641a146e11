//! Composition root owning every piece of pipeline state.

use std::sync::Arc;

use crate::camera::{Camera, CameraRef, SharedCamera};
use crate::draw::Draw;
use crate::job::DrawJob;
use crate::lifecycle::{
    EventKind, HostEvent, HostEvents, LifecycleCoordinator, ResetReason, Subscription,
    TickContext,
};
use crate::queue::CommandQueue;
use crate::render::{BatchedRenderer, DrawSurface, RenderStats};
use crate::settings::{Settings, SettingsError};
use crate::shape::{Shape, Style};
use crate::text::{Cadence, FlushStats, TextJob, TextOverlay};

/// Queues, settings and lifecycle of one debug-draw pipeline.
///
/// Producers draw through [`RenderState::draw`]; the host drains through
/// [`RenderState::render`] and [`RenderState::tick_text`], or by emitting
/// events on a hub the state was installed on with
/// [`crate::lifecycle::install`].
pub struct RenderState {
    queue: CommandQueue,
    text: TextOverlay,
    settings: Settings,
    lifecycle: LifecycleCoordinator,
    cadence: Cadence,
    text_camera: Option<CameraRef>,
    events: Option<HostEvents<RenderState>>,
    text_hooks: Vec<Subscription>,
    last_stats: RenderStats,
    last_text_stats: FlushStats,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl RenderState {
    pub fn new(settings: Settings) -> Self {
        Self {
            queue: CommandQueue::new(),
            text: TextOverlay::new(),
            settings,
            lifecycle: LifecycleCoordinator::new(),
            cadence: Cadence::Frame,
            text_camera: None,
            events: None,
            text_hooks: Vec::new(),
            last_stats: RenderStats::default(),
            last_text_stats: FlushStats::default(),
        }
    }

    /// Draw API entry point.
    pub fn draw(&mut self) -> Draw<'_> {
        Draw::new(self)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings after validating them.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn text_overlay(&self) -> &TextOverlay {
        &self.text
    }

    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    /// Stats of the most recent drain.
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Stats of the most recent text flush.
    pub fn last_text_stats(&self) -> FlushStats {
        self.last_text_stats
    }

    /// Cadence assigned to labels queued without an explicit one.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Runs `f` with labels defaulting to `cadence`.
    pub fn with_cadence<R>(&mut self, cadence: Cadence, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.cadence, cadence);
        let result = f(self);
        self.cadence = previous;
        result
    }

    /// Camera used for labels queued without an explicit one.
    pub fn set_text_camera(&mut self, camera: &SharedCamera) {
        self.text_camera = Some(Arc::downgrade(camera));
    }

    pub fn enqueue(&mut self, job: DrawJob) {
        self.queue.enqueue(job);
        self.lifecycle.on_enqueue();
    }

    /// Tessellates a shape into the command queue, or queues it as a label.
    pub fn submit(&mut self, shape: Shape, style: Style) {
        match shape {
            Shape::Text {
                position,
                text,
                anchor,
                offset,
                cadence,
                camera,
            } => {
                let Some(camera) = camera.or_else(|| self.text_camera.clone()) else {
                    tracing::debug!("Dropping label `{}`: no camera", text);
                    return;
                };
                let position = style
                    .transform
                    .map_or(position, |m| m.transform_point3(position));
                let color = style.color.unwrap_or(self.settings.colors.text);
                let job = TextJob::new(position, text, color, camera)
                    .with_anchor(anchor)
                    .with_offset(offset);
                self.queue_text(cadence.unwrap_or(self.cadence), job);
            }
            shape => {
                for job in shape.tessellate(&style, &self.settings) {
                    self.enqueue(job);
                }
            }
        }
    }

    /// Queues a label, subscribing the tick hooks on first use.
    pub fn queue_text(&mut self, cadence: Cadence, job: TextJob) {
        if self.text.queue(cadence, job) || self.text_hooks.is_empty() {
            self.subscribe_text_hooks();
        }
    }

    fn subscribe_text_hooks(&mut self) {
        let Some(events) = &self.events else {
            return;
        };
        if !self.text_hooks.is_empty() {
            return;
        }
        self.text_hooks = [Cadence::Frame, Cadence::Fixed]
            .into_iter()
            .map(|cadence| {
                events.subscribe(EventKind::tick(cadence), |state: &mut RenderState, event| {
                    if let HostEvent::Tick { cadence, context } = event {
                        state.tick_text(*cadence, context);
                    }
                })
            })
            .collect();
    }

    /// Drains the command queue into `surface`.
    pub fn render(&mut self, camera: Option<&Camera>, surface: &mut dyn DrawSurface) -> RenderStats {
        self.lifecycle.begin_drain();
        let stats = BatchedRenderer::render(&mut self.queue, &self.settings, camera, surface);
        self.lifecycle.end_drain();
        self.last_stats = stats;
        stats
    }

    /// Flushes one text cadence.
    pub fn tick_text(&mut self, cadence: Cadence, context: &mut TickContext<'_>) -> FlushStats {
        let stats = self.text.tick(
            cadence,
            context.simulating,
            context.overlays_visible,
            &self.settings,
            context.measure,
            &mut *context.painter,
        );
        if !self.text.is_registered() {
            self.text_hooks.clear();
        }
        self.last_text_stats = stats;
        stats
    }

    /// Clears the command queue and both text sub-queues.
    pub fn reset(&mut self, reason: ResetReason) {
        self.queue.clear();
        self.text.clear();
        self.lifecycle.reset(reason);
    }

    /// Keeps a hub handle for lazy text hook subscription.
    pub fn attach(&mut self, events: HostEvents<RenderState>) {
        self.events = Some(events);
    }

    /// Drops the hub handle and any text hooks.
    pub fn detach(&mut self) {
        self.text_hooks.clear();
        self.events = None;
    }

    pub fn is_attached(&self) -> bool {
        self.events.is_some()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::color::Color;
    use crate::lifecycle::LifecycleState;
    use crate::render::tests::{RecordingSurface, test_camera};

    #[test]
    fn test_scenario_render_empties_queue() {
        let mut state = RenderState::default();
        state.draw().line(Vec3::ZERO, Vec3::X);
        assert_eq!(state.queue().len(), 1);

        let camera = test_camera();
        let mut surface = RecordingSurface::default();
        let stats = state.render(Some(&camera), &mut surface);
        assert_eq!(stats.jobs, 1);
        assert!(state.queue().is_empty());
        assert_eq!(state.last_stats(), stats);
        assert_eq!(state.lifecycle().state(), LifecycleState::Idle);
    }

    #[test]
    fn test_render_without_camera_still_clears() {
        let mut state = RenderState::default();
        state.draw().sphere(Vec3::ZERO, 1.0);
        let mut surface = RecordingSurface::default();
        let stats = state.render(None, &mut surface);
        assert_eq!(stats.discarded, 1);
        assert!(state.queue().is_empty());
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_reset_clears_all_queues() {
        let mut state = RenderState::default();
        let camera = test_camera().into_shared();
        state.set_text_camera(&camera);
        state.draw().point(Vec3::ONE);
        state.draw().text(Vec3::ZERO, "frame");
        state.with_cadence(Cadence::Fixed, |state| {
            state.draw().text(Vec3::ZERO, "fixed");
        });

        state.reset(ResetReason::Manual);
        assert_eq!(state.queue().len(), 0);
        assert_eq!(state.text_overlay().len(Cadence::Frame), 0);
        assert_eq!(state.text_overlay().len(Cadence::Fixed), 0);
    }

    #[test]
    fn test_detach_drops_text_hooks_until_reattached() {
        let events = HostEvents::new();
        let mut state = RenderState::default();
        let _installation = crate::lifecycle::install(&mut state, &events).unwrap();
        let camera = test_camera().into_shared();
        state.set_text_camera(&camera);
        assert!(state.is_attached());

        state.draw().text(Vec3::ZERO, "a");
        assert_eq!(events.handler_count(EventKind::FrameTick), 1);

        state.detach();
        assert!(!state.is_attached());
        assert_eq!(events.handler_count(EventKind::FrameTick), 0);
        state.draw().text(Vec3::ZERO, "b");
        assert_eq!(events.handler_count(EventKind::FrameTick), 0);

        state.attach(events.clone());
        state.draw().text(Vec3::ZERO, "c");
        assert_eq!(events.handler_count(EventKind::FrameTick), 1);
        assert_eq!(state.text_overlay().len(Cadence::Frame), 3);
    }

    #[test]
    fn test_with_cadence_restores_previous() {
        let mut state = RenderState::default();
        let inner = state.with_cadence(Cadence::Fixed, |state| state.cadence());
        assert_eq!(inner, Cadence::Fixed);
        assert_eq!(state.cadence(), Cadence::Frame);
    }

    #[test]
    fn test_set_settings_validates() {
        let mut state = RenderState::default();
        let bad = Settings {
            transparency: 2.0,
            ..Default::default()
        };
        assert!(state.set_settings(bad).is_err());
        assert_eq!(state.settings().transparency, 1.0);

        let good = Settings {
            transparency: 0.5,
            ..Default::default()
        };
        assert!(state.set_settings(good).is_ok());
        assert_eq!(state.settings().transparency, 0.5);
    }

    #[test]
    fn test_text_transform_moves_anchor() {
        let mut state = RenderState::default();
        let camera = test_camera().into_shared();
        state.set_text_camera(&camera);
        state
            .draw()
            .text(Vec3::ZERO, "moved")
            .transform(glam::Mat4::from_translation(Vec3::Y))
            .color(Color::CYAN);

        let job = &state.text_overlay().jobs(Cadence::Frame)[0];
        assert_eq!(job.position, Vec3::Y);
        assert_eq!(job.color, Color::CYAN);
    }
}

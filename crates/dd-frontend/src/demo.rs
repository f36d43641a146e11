//! Demo callers exercising the draw API, plus the static occluder scene.

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Quat, Vec2, Vec3};

use dd_core::primitives::box_corners;
use dd_core::text::markup;
use dd_core::{Color, LabelAnchor, RenderState};
use dd_renderer::DebugVertex;

use crate::config::DemoScene;

const GRAVITY: f32 = -9.81;
const RESTITUTION: f32 = 0.82;
const TRAIL_LENGTH: usize = 48;

/// Opaque boxes that occlude part of the demo geometry.
pub const OCCLUDERS: [(Vec3, Vec3); 2] = [
    (Vec3::new(1.8, 0.75, 0.0), Vec3::new(0.75, 0.75, 0.75)),
    (Vec3::new(-2.2, 0.5, -1.0), Vec3::new(0.5, 0.5, 1.2)),
];

/// Rotating sensor probe, animated per frame while playing.
#[derive(Debug, Clone)]
pub struct SpinningProbe {
    pub origin: Vec3,
    pub angle: f32,
    /// Radians per second
    pub speed: f32,
}

impl Default for SpinningProbe {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 1.2, 0.0),
            angle: 0.0,
            speed: 0.9,
        }
    }
}

impl SpinningProbe {
    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.speed * dt).rem_euclid(TAU);
    }

    pub fn direction(&self) -> Vec3 {
        Quat::from_rotation_y(self.angle) * Vec3::X
    }

    pub fn draw(&self, state: &mut RenderState) {
        let dir = self.direction();
        let tip = self.origin + dir * 2.5;
        let mut draw = state.draw();

        draw.axes(self.origin, 0.6)
            .rotation(Quat::from_rotation_y(self.angle));
        draw.circle(self.origin, Vec3::Y, 2.5);
        draw.arc(self.origin, Vec3::Y, Vec3::X, self.angle, 1.0)
            .color(Color::YELLOW);
        draw.arrow(self.origin, tip).color(Color::ORANGE);
        draw.cone(tip, dir, 1.2, 0.35).segments(16);
        draw.ray(self.origin, Vec3::NEG_Y * self.origin.y)
            .color(Color::GRAY);
        draw.text(
            tip + Vec3::Y * 0.3,
            format!(
                "probe {}",
                markup::colored(
                    &format!("{:.0}°", self.angle.to_degrees()),
                    Color::YELLOW
                )
            ),
        )
        .anchor(LabelAnchor::BottomCenter);
    }
}

/// Ball integrated on the fixed tick, bouncing on the ground plane.
#[derive(Debug, Clone)]
pub struct BouncingMarker {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    trail: VecDeque<Vec3>,
}

impl Default for BouncingMarker {
    fn default() -> Self {
        Self {
            position: Vec3::new(-0.5, 3.0, 1.8),
            velocity: Vec3::new(0.9, 0.0, -0.6),
            radius: 0.25,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }
}

impl BouncingMarker {
    pub fn step(&mut self, dt: f32) {
        self.velocity.y += GRAVITY * dt;
        self.position += self.velocity * dt;

        if self.position.y < self.radius {
            self.position.y = self.radius;
            self.velocity.y = -self.velocity.y * RESTITUTION;
            // Re-launch once it settles
            if self.velocity.y < 1.0 {
                self.velocity.y = 7.0;
            }
        }
        for axis in [0, 2] {
            if self.position[axis].abs() > 3.5 {
                self.position[axis] = self.position[axis].clamp(-3.5, 3.5);
                self.velocity[axis] = -self.velocity[axis];
            }
        }

        if self.trail.len() == TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(self.position);
    }

    pub fn trail(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.trail.iter().copied()
    }

    pub fn draw(&self, state: &mut RenderState) {
        let ground = Vec3::new(self.position.x, 0.0, self.position.z);
        let mut draw = state.draw();

        draw.sphere(self.position, self.radius).color(Color::CYAN);
        draw.point(self.position).size(self.radius * 0.5);
        draw.dotted_line(self.position, ground).dash_length(0.08);
        draw.circle(ground, Vec3::Y, self.radius).segments(12);
        draw.polyline(self.trail()).color(Color::CYAN.with_alpha(0.5));
        draw.text(
            self.position,
            format!("v = {:.2} m/s", self.velocity.length()),
        )
        .anchor(LabelAnchor::TopLeft)
        .offset(Vec2::new(12.0, -6.0));
    }
}

/// Every demo caller.
#[derive(Debug, Clone, Default)]
pub struct Demo {
    pub probe: SpinningProbe,
    pub marker: BouncingMarker,
    scene: DemoScene,
    time: f32,
}

impl Demo {
    pub fn new(scene: DemoScene) -> Self {
        Self {
            scene,
            ..Default::default()
        }
    }

    pub fn scene(&self) -> DemoScene {
        self.scene
    }

    /// Restarts every caller, keeping the scene.
    pub fn reset(&mut self) {
        *self = Self::new(self.scene);
    }

    /// Frame-cadence callers.
    pub fn update(&mut self, dt: f32, playing: bool, state: &mut RenderState) {
        if playing {
            self.time += dt;
            self.probe.advance(dt);
        }
        if self.scene.has_moving() {
            self.probe.draw(state);
        }
        if self.scene.has_showcase() {
            draw_showcase(self.time, state);
        }
    }

    /// Fixed-cadence callers.
    pub fn fixed_update(&mut self, step: f32, state: &mut RenderState) {
        if !self.scene.has_moving() {
            return;
        }
        self.marker.step(step);
        self.marker.draw(state);
    }
}

/// Shapes with no behaviour, covering the rest of the draw API.
fn draw_showcase(time: f32, state: &mut RenderState) {
    let mut draw = state.draw();

    for (center, half) in OCCLUDERS {
        draw.bounds(center - half * 1.05, center + half * 1.05);
    }

    draw.cube(Vec3::new(0.0, 0.75, -2.5), Vec3::splat(0.8))
        .rotation(Quat::from_rotation_y(time * 0.5));
    draw.wire_box(
        Vec3::new(2.0, 0.4, -2.5),
        Vec3::new(0.6, 0.4, 0.3),
        Quat::from_rotation_z(0.3),
    );
    draw.diamond(Vec3::new(-2.2, 1.6, -1.0), 0.35)
        .solid()
        .color(Color::MAGENTA.with_alpha(0.8));
    draw.diamond(Vec3::new(-2.2, 1.6, -1.0), 0.45);
    draw.capsule(Vec3::new(2.8, 0.3, 1.8), Vec3::new(2.8, 1.7, 1.8), 0.3);
    draw.triangle(
        Vec3::new(-3.0, 0.01, 2.0),
        Vec3::new(-2.0, 0.01, 2.0),
        Vec3::new(-2.5, 0.01, 3.0),
    )
    .color(Color::GREEN.with_alpha(0.6));

    let hexagon = (0..6).map(|i| {
        let a = i as f32 * TAU / 6.0;
        Vec3::new(a.cos() * 0.6 - 0.5, 0.02, a.sin() * 0.6 + 2.8)
    });
    draw.polyline(hexagon).closed().color(Color::WHITE);

    // Passes through the first occluder
    draw.line(Vec3::new(0.5, 0.75, 0.0), Vec3::new(3.5, 0.75, 0.0))
        .color(Color::RED);
    draw.sphere(Vec3::new(1.8, 0.75, 0.0), 0.5)
        .color(Color::RED);
    draw.text(Vec3::new(1.8, 1.7, 0.0), "<color=red>hidden</color> sphere")
        .anchor(LabelAnchor::BottomCenter);
    draw.sphere(Vec3::ZERO, 0.05).segments(8);
    draw.text(Vec3::ZERO, "origin")
        .offset(Vec2::new(0.0, 14.0))
        .color(Color::GRAY);
    draw.arc(
        Vec3::new(0.0, 0.01, 0.0),
        Vec3::Y,
        Vec3::Z,
        FRAC_PI_2,
        4.0,
    );
}

/// Ground grid (line list) and occluder boxes (triangle list).
pub fn scene_geometry() -> (Vec<DebugVertex>, Vec<DebugVertex>) {
    let mut lines = Vec::new();
    let grid = Color::rgb(0.26, 0.26, 0.3);
    let extent = 10.0;
    for i in -10..=10 {
        let t = i as f32;
        let color = if i == 0 { Color::rgb(0.4, 0.4, 0.45) } else { grid };
        lines.push(DebugVertex::new(Vec3::new(t, 0.0, -extent), color));
        lines.push(DebugVertex::new(Vec3::new(t, 0.0, extent), color));
        lines.push(DebugVertex::new(Vec3::new(-extent, 0.0, t), color));
        lines.push(DebugVertex::new(Vec3::new(extent, 0.0, t), color));
    }

    let mut triangles = Vec::new();
    for (center, half) in OCCLUDERS {
        triangles.extend(box_triangles(center, half, Color::rgb(0.42, 0.44, 0.5)));
    }

    (lines, triangles)
}

/// Solid box faces, shaded per axis.
fn box_triangles(center: Vec3, half_extents: Vec3, base: Color) -> Vec<DebugVertex> {
    let corners = box_corners(half_extents, Quat::IDENTITY).map(|c| c + center);
    let mut out = Vec::with_capacity(36);
    for axis in 0..3usize {
        let b = 1 << ((axis + 1) % 3);
        let c = 1 << ((axis + 2) % 3);
        for side in [0, 1 << axis] {
            let shade = 0.7 + 0.1 * axis as f32 + if side == 0 { 0.0 } else { 0.1 };
            let color = base.scale(shade);
            let quad = [side, side | b, side | b | c, side | c].map(|i| corners[i]);
            for i in [0, 1, 2, 0, 2, 3] {
                out.push(DebugVertex::new(quad[i], color));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use dd_core::Cadence;

    #[test]
    fn test_marker_stays_above_ground() {
        let mut marker = BouncingMarker::default();
        for _ in 0..2000 {
            marker.step(0.02);
            assert!(marker.position.y >= marker.radius - 1e-5);
            assert!(marker.position.x.abs() <= 3.5 + 1e-5);
        }
        assert_eq!(marker.trail().count(), TRAIL_LENGTH);
    }

    #[test]
    fn test_probe_wraps_angle() {
        let mut probe = SpinningProbe::default();
        probe.advance(100.0);
        assert!((0.0..TAU).contains(&probe.angle));
        assert_relative_eq!(probe.direction().length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_demo_fills_queues() {
        let mut state = RenderState::default();
        let camera = dd_core::Camera::default().into_shared();
        state.set_text_camera(&camera);
        let mut demo = Demo::default();

        demo.update(0.016, true, &mut state);
        state.with_cadence(Cadence::Fixed, |state| demo.fixed_update(0.02, state));

        assert!(state.queue().len() > 10);
        assert!(state.queue().jobs().iter().all(|j| j.is_well_formed()));
        assert!(state.text_overlay().len(Cadence::Frame) >= 2);
        assert_eq!(state.text_overlay().len(Cadence::Fixed), 1);
    }

    #[test]
    fn test_showcase_scene_skips_moving_callers() {
        let mut state = RenderState::default();
        let mut demo = Demo::new(DemoScene::Showcase);

        demo.fixed_update(0.02, &mut state);
        assert!(state.queue().is_empty());

        demo.update(0.016, true, &mut state);
        assert!(!state.queue().is_empty());

        demo.reset();
        assert_eq!(demo.scene(), DemoScene::Showcase);
    }

    #[test]
    fn test_scene_geometry_is_complete_primitives() {
        let (lines, triangles) = scene_geometry();
        assert_eq!(lines.len() % 2, 0);
        assert_eq!(triangles.len(), OCCLUDERS.len() * 36);
    }
}

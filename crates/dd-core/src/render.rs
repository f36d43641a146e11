//! Batched renderer: drains the command queue into an immediate-mode
//! [`DrawSurface`] with dual-pass occlusion compositing.
//!
//! ```text
//! render(queue, settings, camera, surface)
//!   ├─ near pass      depth Less (Always when occlusion is disabled)
//!   │     begin/end a batch only when the draw mode changes
//!   ├─ occluded pass  depth Greater, alpha scaled by the attenuation factor
//!   │     (RGB untouched; skipped when the attenuation factor is 1.0)
//!   └─ clear queue    unconditionally, even without a camera
//! ```

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::color::Color;
use crate::dash::dashes;
use crate::job::{DrawJob, DrawMode, JobKind};
use crate::primitives;
use crate::queue::CommandQueue;
use crate::settings::Settings;

/// Depth comparison used for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthTest {
    /// Draw regardless of scene depth
    Always,
    /// Draw only where the geometry is in front of the scene
    Less,
    /// Draw only where the geometry is hidden behind the scene
    Greater,
}

/// Immediate-mode draw target consumed by [`BatchedRenderer`].
///
/// Calls always arrive in the order
/// `begin_pass (begin vertex* end)* end_pass`.
pub trait DrawSurface {
    /// Starts a pass with the camera's view-projection and a depth test.
    fn begin_pass(&mut self, view_projection: Mat4, depth: DepthTest);

    /// Opens a batch of the given primitive mode.
    fn begin(&mut self, mode: DrawMode);

    /// Emits one world-space vertex into the open batch.
    fn vertex(&mut self, position: Vec3, color: Color);

    /// Closes the open batch.
    fn end(&mut self);

    /// Finishes the pass.
    fn end_pass(&mut self) {}
}

/// Counters from one [`BatchedRenderer::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Jobs found in the queue
    pub jobs: usize,
    /// Passes executed (0, 1 or 2)
    pub passes: usize,
    /// Batches opened across all passes
    pub batches: usize,
    /// Vertices emitted across all passes
    pub vertices: usize,
    /// Malformed jobs skipped
    pub skipped: usize,
    /// Jobs cleared without drawing because no camera was available
    pub discarded: usize,
}

/// Drains a [`CommandQueue`] into a [`DrawSurface`].
pub struct BatchedRenderer;

impl BatchedRenderer {
    /// Renders and clears the queue.
    ///
    /// Without a camera nothing is drawn, but the queue is still cleared so
    /// it cannot grow while the viewport is not being repainted.
    pub fn render(
        queue: &mut CommandQueue,
        settings: &Settings,
        camera: Option<&Camera>,
        surface: &mut dyn DrawSurface,
    ) -> RenderStats {
        let mut stats = RenderStats {
            jobs: queue.len(),
            ..Default::default()
        };

        let Some(camera) = camera else {
            stats.discarded = queue.len();
            queue.clear();
            return stats;
        };

        if queue.is_empty() {
            return stats;
        }

        let view_projection = camera.view_projection();
        let occlusion = settings.occlusion_enabled();
        let near = if occlusion {
            DepthTest::Less
        } else {
            DepthTest::Always
        };

        draw_pass(
            queue.jobs(),
            settings,
            view_projection,
            near,
            1.0,
            surface,
            &mut stats,
        );

        if occlusion {
            draw_pass(
                queue.jobs(),
                settings,
                view_projection,
                DepthTest::Greater,
                settings.occluded_attenuation,
                surface,
                &mut stats,
            );
        }

        if stats.skipped > 0 {
            tracing::warn!("Skipped {} malformed debug-draw jobs", stats.skipped);
        }
        tracing::trace!(
            jobs = stats.jobs,
            batches = stats.batches,
            vertices = stats.vertices,
            "Drained debug-draw queue"
        );

        queue.clear();
        stats
    }
}

fn draw_pass(
    jobs: &[DrawJob],
    settings: &Settings,
    view_projection: Mat4,
    depth: DepthTest,
    attenuation: f32,
    surface: &mut dyn DrawSurface,
    stats: &mut RenderStats,
) {
    surface.begin_pass(view_projection, depth);
    stats.passes += 1;

    // Attenuation scales alpha only; RGB is kept
    let alpha = settings.transparency * attenuation;
    let mut active: Option<DrawMode> = None;

    for job in jobs {
        if !job.is_well_formed() {
            // Counted once per job, not per pass
            if depth != DepthTest::Greater {
                stats.skipped += 1;
            }
            continue;
        }

        let mode = job.kind.mode();
        if active != Some(mode) {
            if active.is_some() {
                surface.end();
            }
            surface.begin(mode);
            active = Some(mode);
            stats.batches += 1;
        }

        stats.vertices += emit_job(job, job.color.fade(alpha), surface);
    }

    if active.is_some() {
        surface.end();
    }
    surface.end_pass();
}

/// Emits the vertices of one well-formed job, returning how many were sent.
fn emit_job(job: &DrawJob, color: Color, surface: &mut dyn DrawSurface) -> usize {
    let matrix = job.matrix();
    let mut count = 0;
    let mut emit = |p: Vec3| {
        surface.vertex(p, color);
        count += 1;
    };

    match job.kind {
        JobKind::Point { size } => {
            let center = matrix.transform_point3(job.vertices[0]);
            for arm in primitives::cross() {
                emit(center + arm * size);
            }
        }
        JobKind::DottedLine { dash_length } => {
            let a = matrix.transform_point3(job.vertices[0]);
            let b = matrix.transform_point3(job.vertices[1]);
            for (start, end) in dashes(a, b, dash_length) {
                emit(start);
                emit(end);
            }
        }
        JobKind::Line | JobKind::Triangle | JobKind::PolylineMesh => {
            for v in &job.vertices {
                emit(matrix.transform_point3(*v));
            }
        }
    }

    count
}

#[cfg(test)]
pub(crate) mod tests {
    use glam::Vec2;

    use super::*;

    /// Surface call as observed by [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        BeginPass(DepthTest),
        Begin(DrawMode),
        Vertex(Vec3, Color),
        End,
        EndPass,
    }

    /// Records every call for inspection.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<SurfaceCall>,
    }

    impl RecordingSurface {
        pub fn vertices(&self) -> Vec<(Vec3, Color)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    SurfaceCall::Vertex(p, color) => Some((*p, *color)),
                    _ => None,
                })
                .collect()
        }

        pub fn passes(&self) -> Vec<DepthTest> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    SurfaceCall::BeginPass(d) => Some(*d),
                    _ => None,
                })
                .collect()
        }

        pub fn begins(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, SurfaceCall::Begin(_)))
                .count()
        }
    }

    impl DrawSurface for RecordingSurface {
        fn begin_pass(&mut self, _view_projection: Mat4, depth: DepthTest) {
            self.calls.push(SurfaceCall::BeginPass(depth));
        }

        fn begin(&mut self, mode: DrawMode) {
            self.calls.push(SurfaceCall::Begin(mode));
        }

        fn vertex(&mut self, position: Vec3, color: Color) {
            self.calls.push(SurfaceCall::Vertex(position, color));
        }

        fn end(&mut self) {
            self.calls.push(SurfaceCall::End);
        }

        fn end_pass(&mut self) {
            self.calls.push(SurfaceCall::EndPass);
        }
    }

    pub fn test_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec2::new(800.0, 600.0))
    }

    fn no_occlusion() -> Settings {
        Settings {
            occluded_attenuation: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_line_drains_queue() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Color::WHITE,
        ));

        let mut surface = RecordingSurface::default();
        let stats = BatchedRenderer::render(
            &mut queue,
            &Settings::default(),
            Some(&test_camera()),
            &mut surface,
        );

        assert_eq!(queue.len(), 0);
        assert_eq!(stats.jobs, 1);
        assert_eq!(stats.passes, 2);
        assert_eq!(surface.passes(), vec![DepthTest::Less, DepthTest::Greater]);
    }

    #[test]
    fn test_second_render_is_noop() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE));
        let settings = Settings::default();
        let camera = test_camera();

        let mut first = RecordingSurface::default();
        BatchedRenderer::render(&mut queue, &settings, Some(&camera), &mut first);

        let mut second = RecordingSurface::default();
        let stats = BatchedRenderer::render(&mut queue, &settings, Some(&camera), &mut second);

        assert!(second.calls.is_empty());
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn test_mode_switches_only_on_change() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE));
        queue.enqueue(DrawJob::point(Vec3::ZERO, 0.1, Color::WHITE));
        queue.enqueue(DrawJob::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, Color::WHITE));
        queue.enqueue(DrawJob::triangle(Vec3::ZERO, Vec3::Y, Vec3::Z, Color::WHITE));
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::Y, Color::WHITE));

        let mut surface = RecordingSurface::default();
        BatchedRenderer::render(&mut queue, &no_occlusion(), Some(&test_camera()), &mut surface);

        // Lines, Triangles, Lines: no resorting
        let modes: Vec<DrawMode> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Begin(m) => Some(*m),
                _ => None,
            })
            .collect();
        assert_eq!(
            modes,
            vec![DrawMode::Lines, DrawMode::Triangles, DrawMode::Lines]
        );

        let begins = surface.begins();
        let ends = surface
            .calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::End))
            .count();
        assert_eq!(begins, ends);
    }

    #[test]
    fn test_dotted_line_expands_at_draw_time() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::dotted_line(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            1.0,
            Color::WHITE,
        ));
        // Still a single job in the queue
        assert_eq!(queue.len(), 1);

        let mut surface = RecordingSurface::default();
        let stats =
            BatchedRenderer::render(&mut queue, &no_occlusion(), Some(&test_camera()), &mut surface);

        // Five visible dashes, two vertices each
        assert_eq!(stats.vertices, 10);
        assert_eq!(surface.vertices().len(), 10);
    }

    #[test]
    fn test_occluded_pass_attenuates_alpha() {
        let mut queue = CommandQueue::new();
        let color = Color::rgba(1.0, 0.0, 0.0, 0.8);
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, color));

        let settings = Settings {
            occluded_attenuation: 0.5,
            ..Default::default()
        };
        let mut surface = RecordingSurface::default();
        BatchedRenderer::render(&mut queue, &settings, Some(&test_camera()), &mut surface);

        let verts = surface.vertices();
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].1.a, 0.8);
        assert_eq!(verts[2].1.a, 0.4);
        assert_eq!(verts[2].1.r, 1.0);
    }

    #[test]
    fn test_attenuation_one_matches_single_pass() {
        let color = Color::rgba(0.2, 0.4, 0.6, 0.5);
        let settings = Settings {
            transparency: 0.5,
            ..no_occlusion()
        };
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, color));
        queue.enqueue(DrawJob::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, color));

        let mut surface = RecordingSurface::default();
        let stats =
            BatchedRenderer::render(&mut queue, &settings, Some(&test_camera()), &mut surface);

        assert_eq!(stats.passes, 1);
        assert_eq!(surface.passes(), vec![DepthTest::Always]);
        for (_, c) in surface.vertices() {
            assert_eq!(c, color.fade(0.5));
        }
    }

    #[test]
    fn test_missing_camera_clears_without_drawing() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE));

        let mut surface = RecordingSurface::default();
        let stats = BatchedRenderer::render(&mut queue, &Settings::default(), None, &mut surface);

        assert!(queue.is_empty());
        assert!(surface.calls.is_empty());
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_tiny_dash_length_stays_bounded() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::dotted_line(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            1e-40,
            Color::WHITE,
        ));

        let mut surface = RecordingSurface::default();
        let stats =
            BatchedRenderer::render(&mut queue, &no_occlusion(), Some(&test_camera()), &mut surface);
        assert_eq!(stats.vertices, crate::dash::MAX_DASHES);
    }

    #[test]
    fn test_malformed_job_is_skipped() {
        let mut queue = CommandQueue::new();
        let mut bad = DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE);
        bad.vertices.truncate(1);
        queue.push_unchecked(bad);
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::Y, Color::WHITE));

        let mut surface = RecordingSurface::default();
        let stats =
            BatchedRenderer::render(&mut queue, &no_occlusion(), Some(&test_camera()), &mut surface);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.vertices, 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_point_and_transform() {
        let mut queue = CommandQueue::new();
        queue.enqueue(
            DrawJob::point(Vec3::ZERO, 0.5, Color::WHITE)
                .with_transform(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))),
        );

        let mut surface = RecordingSurface::default();
        BatchedRenderer::render(&mut queue, &no_occlusion(), Some(&test_camera()), &mut surface);

        let verts = surface.vertices();
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].0, Vec3::new(0.5, 2.0, 3.0));
        assert_eq!(verts[1].0, Vec3::new(1.5, 2.0, 3.0));
    }
}

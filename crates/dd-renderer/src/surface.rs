//! CPU-side batch recording.
//!
//! [`BatchSurface`] implements the pipeline's immediate-mode
//! [`DrawSurface`] by appending vertices to one buffer and recording a
//! [`Batch`] per mode switch. The GPU renderer uploads the buffer once and
//! replays the batches with the matching pipelines.

use std::ops::Range;

use glam::{Mat4, Vec3};

use dd_core::{Color, DepthTest, DrawMode, DrawSurface};

use crate::vertex::DebugVertex;

/// A contiguous vertex range drawn with one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub mode: DrawMode,
    pub depth: DepthTest,
    pub vertices: Range<u32>,
}

/// Records debug-draw passes into GPU-ready batches.
#[derive(Debug, Default)]
pub struct BatchSurface {
    vertices: Vec<DebugVertex>,
    batches: Vec<Batch>,
    view_projection: Option<Mat4>,
    depth: Option<DepthTest>,
    open: Option<(DrawMode, u32)>,
}

impl BatchSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// View-projection of the last pass, if any pass ran.
    pub fn view_projection(&self) -> Option<Mat4> {
        self.view_projection
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Forgets recorded geometry, keeping allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.batches.clear();
        self.view_projection = None;
        self.depth = None;
        self.open = None;
    }

    fn close(&mut self) {
        let Some((mode, start)) = self.open.take() else {
            return;
        };
        let end = self.vertices.len() as u32;
        let vertex_multiple = match mode {
            DrawMode::Lines => 2,
            DrawMode::Triangles => 3,
        };
        // Incomplete trailing primitives would be dropped by the GPU anyway
        let end = end - (end - start) % vertex_multiple;
        self.vertices.truncate(end as usize);
        if end > start {
            self.batches.push(Batch {
                mode,
                depth: self.depth.unwrap_or(DepthTest::Always),
                vertices: start..end,
            });
        }
    }
}

impl DrawSurface for BatchSurface {
    fn begin_pass(&mut self, view_projection: Mat4, depth: DepthTest) {
        self.close();
        self.view_projection = Some(view_projection);
        self.depth = Some(depth);
    }

    fn begin(&mut self, mode: DrawMode) {
        self.close();
        self.open = Some((mode, self.vertices.len() as u32));
    }

    fn vertex(&mut self, position: Vec3, color: Color) {
        if self.open.is_none() {
            tracing::warn!("Debug vertex emitted outside of a batch");
            return;
        }
        self.vertices.push(DebugVertex::new(position, color));
    }

    fn end(&mut self) {
        self.close();
    }

    fn end_pass(&mut self) {
        self.close();
        self.depth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::{Camera, DrawJob, RenderState, Settings};
    use glam::Vec2;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_records_one_batch_per_mode_run() {
        let mut state = RenderState::new(Settings {
            occluded_attenuation: 1.0,
            ..Default::default()
        });
        state.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE));
        state.enqueue(DrawJob::line(Vec3::ZERO, Vec3::Y, Color::WHITE));
        state.enqueue(DrawJob::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, Color::RED));
        state.enqueue(DrawJob::line(Vec3::ZERO, Vec3::Z, Color::WHITE));

        let mut surface = BatchSurface::new();
        state.render(Some(&camera()), &mut surface);

        let batches = surface.batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].mode, DrawMode::Lines);
        assert_eq!(batches[0].vertices, 0..4);
        assert_eq!(batches[1].mode, DrawMode::Triangles);
        assert_eq!(batches[1].vertices, 4..7);
        assert_eq!(batches[2].vertices, 7..9);
        assert!(batches.iter().all(|b| b.depth == DepthTest::Always));
        assert_eq!(surface.vertices().len(), 9);
    }

    #[test]
    fn test_occlusion_records_two_passes() {
        let mut state = RenderState::default();
        state.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::WHITE));

        let mut surface = BatchSurface::new();
        state.render(Some(&camera()), &mut surface);

        let depths: Vec<DepthTest> = surface.batches().iter().map(|b| b.depth).collect();
        assert_eq!(depths, vec![DepthTest::Less, DepthTest::Greater]);
        let occluded_alpha = surface.vertices()[2].color[3];
        assert!(occluded_alpha < surface.vertices()[0].color[3]);
        assert!(surface.view_projection().is_some());
    }

    #[test]
    fn test_empty_batches_are_dropped() {
        let mut surface = BatchSurface::new();
        surface.begin_pass(Mat4::IDENTITY, DepthTest::Less);
        surface.begin(DrawMode::Lines);
        surface.end();
        surface.end_pass();
        assert!(surface.is_empty());
    }

    #[test]
    fn test_incomplete_primitive_is_trimmed() {
        let mut surface = BatchSurface::new();
        surface.begin_pass(Mat4::IDENTITY, DepthTest::Less);
        surface.begin(DrawMode::Triangles);
        for _ in 0..4 {
            surface.vertex(Vec3::ZERO, Color::WHITE);
        }
        surface.end();
        surface.end_pass();
        assert_eq!(surface.batches()[0].vertices, 0..3);
        assert_eq!(surface.vertices().len(), 3);
    }

    #[test]
    fn test_clear_resets() {
        let mut surface = BatchSurface::new();
        surface.begin_pass(Mat4::IDENTITY, DepthTest::Less);
        surface.begin(DrawMode::Lines);
        surface.vertex(Vec3::ZERO, Color::WHITE);
        surface.vertex(Vec3::X, Color::WHITE);
        surface.end();
        surface.end_pass();
        surface.clear();
        assert!(surface.is_empty());
        assert!(surface.vertices().is_empty());
        assert!(surface.view_projection().is_none());
    }
}

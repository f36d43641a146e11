//! Inbound draw API.
//!
//! Every call returns a builder that is submitted when dropped, so a bare
//! statement is enough:
//!
//! ```
//! # use dd_core::{Color, RenderState};
//! # use glam::Vec3;
//! let mut state = RenderState::default();
//! let mut draw = state.draw();
//! draw.line(Vec3::ZERO, Vec3::X);
//! draw.circle(Vec3::ZERO, Vec3::Y, 2.0).color(Color::ORANGE).segments(12);
//! ```

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::camera::SharedCamera;
use crate::color::Color;
use crate::settings::Settings;
use crate::shape::{Shape, Style};
use crate::state::RenderState;
use crate::text::{Cadence, LabelAnchor};

/// Draw handle borrowed from a [`RenderState`].
pub struct Draw<'a> {
    state: &'a mut RenderState,
}

impl<'a> Draw<'a> {
    pub(crate) fn new(state: &'a mut RenderState) -> Self {
        Self { state }
    }

    pub fn settings(&self) -> &Settings {
        self.state.settings()
    }

    /// Submits any shape.
    pub fn shape(&mut self, shape: Shape) -> ShapeBuilder<'_> {
        ShapeBuilder {
            state: self.state,
            shape: Some(shape),
            style: Style::default(),
        }
    }

    /// Three-axis cross sized by [`ShapeBuilder::size`].
    pub fn point(&mut self, position: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Point {
            position,
            size: None,
        })
    }

    pub fn line(&mut self, start: Vec3, end: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Line { start, end })
    }

    pub fn dotted_line(&mut self, start: Vec3, end: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::DottedLine {
            start,
            end,
            dash_length: None,
        })
    }

    pub fn ray(&mut self, origin: Vec3, direction: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Ray { origin, direction })
    }

    pub fn arrow(&mut self, start: Vec3, end: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Arrow {
            start,
            end,
            tip_size: None,
            tip_width: None,
        })
    }

    pub fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Triangle { a, b, c })
    }

    /// Open polyline; see [`ShapeBuilder::closed`].
    pub fn polyline(&mut self, points: impl IntoIterator<Item = Vec3>) -> ShapeBuilder<'_> {
        self.shape(Shape::Polyline {
            points: points.into_iter().collect(),
            closed: false,
        })
    }

    pub fn circle(&mut self, center: Vec3, normal: Vec3, radius: f32) -> ShapeBuilder<'_> {
        self.shape(Shape::Circle {
            center,
            normal,
            radius,
        })
    }

    /// Arc sweeping `angle` radians from direction `from` around `normal`.
    pub fn arc(
        &mut self,
        center: Vec3,
        normal: Vec3,
        from: Vec3,
        angle: f32,
        radius: f32,
    ) -> ShapeBuilder<'_> {
        self.shape(Shape::Arc {
            center,
            normal,
            from,
            angle,
            radius,
        })
    }

    pub fn sphere(&mut self, center: Vec3, radius: f32) -> ShapeBuilder<'_> {
        self.shape(Shape::Sphere { center, radius })
    }

    /// Wire cube of the given full size; see [`ShapeBuilder::rotation`].
    pub fn cube(&mut self, center: Vec3, size: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Cube {
            center,
            half_extents: size * 0.5,
            rotation: Quat::IDENTITY,
        })
    }

    pub fn wire_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
    ) -> ShapeBuilder<'_> {
        self.shape(Shape::Cube {
            center,
            half_extents,
            rotation,
        })
    }

    pub fn bounds(&mut self, min: Vec3, max: Vec3) -> ShapeBuilder<'_> {
        self.shape(Shape::Bounds { min, max })
    }

    pub fn capsule(&mut self, start: Vec3, end: Vec3, radius: f32) -> ShapeBuilder<'_> {
        self.shape(Shape::Capsule { start, end, radius })
    }

    pub fn cone(
        &mut self,
        apex: Vec3,
        direction: Vec3,
        length: f32,
        half_angle: f32,
    ) -> ShapeBuilder<'_> {
        self.shape(Shape::Cone {
            apex,
            direction,
            length,
            half_angle,
        })
    }

    /// Wire diamond; see [`ShapeBuilder::solid`].
    pub fn diamond(&mut self, center: Vec3, size: f32) -> ShapeBuilder<'_> {
        self.shape(Shape::Diamond {
            center,
            size,
            solid: false,
        })
    }

    pub fn axes(&mut self, origin: Vec3, length: f32) -> ShapeBuilder<'_> {
        self.shape(Shape::Axes {
            origin,
            rotation: Quat::IDENTITY,
            length,
        })
    }

    /// Screen-space label at a world position.
    pub fn text(&mut self, position: Vec3, text: impl Into<String>) -> ShapeBuilder<'_> {
        self.shape(Shape::Text {
            position,
            text: text.into(),
            anchor: LabelAnchor::default(),
            offset: Vec2::ZERO,
            cadence: None,
            camera: None,
        })
    }
}

/// Pending shape, submitted on drop.
///
/// Shape-specific setters are ignored by shapes they do not apply to.
pub struct ShapeBuilder<'s> {
    state: &'s mut RenderState,
    shape: Option<Shape>,
    style: Style,
}

impl ShapeBuilder<'_> {
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    pub fn transform(mut self, transform: Mat4) -> Self {
        self.style.transform = Some(transform);
        self
    }

    /// Tessellation segments for curved shapes.
    pub fn segments(mut self, segments: u32) -> Self {
        self.style.segments = Some(segments);
        self
    }

    /// Cross size for points, scale for diamonds.
    pub fn size(mut self, value: f32) -> Self {
        match &mut self.shape {
            Some(Shape::Point { size, .. }) => *size = Some(value),
            Some(Shape::Diamond { size, .. }) => *size = value,
            _ => {}
        }
        self
    }

    pub fn dash_length(mut self, value: f32) -> Self {
        if let Some(Shape::DottedLine { dash_length, .. }) = &mut self.shape {
            *dash_length = Some(value);
        }
        self
    }

    /// Arrow tip length and half-width relative to that length.
    pub fn tip(mut self, size: f32, width: f32) -> Self {
        if let Some(Shape::Arrow {
            tip_size,
            tip_width,
            ..
        }) = &mut self.shape
        {
            *tip_size = Some(size);
            *tip_width = Some(width);
        }
        self
    }

    pub fn solid(mut self) -> Self {
        if let Some(Shape::Diamond { solid, .. }) = &mut self.shape {
            *solid = true;
        }
        self
    }

    pub fn closed(mut self) -> Self {
        if let Some(Shape::Polyline { closed, .. }) = &mut self.shape {
            *closed = true;
        }
        self
    }

    /// Orientation for cubes and axes.
    pub fn rotation(mut self, value: Quat) -> Self {
        match &mut self.shape {
            Some(Shape::Cube { rotation, .. }) | Some(Shape::Axes { rotation, .. }) => {
                *rotation = value
            }
            _ => {}
        }
        self
    }

    pub fn anchor(mut self, value: LabelAnchor) -> Self {
        if let Some(Shape::Text { anchor, .. }) = &mut self.shape {
            *anchor = value;
        }
        self
    }

    /// Pixel offset for labels.
    pub fn offset(mut self, value: Vec2) -> Self {
        if let Some(Shape::Text { offset, .. }) = &mut self.shape {
            *offset = value;
        }
        self
    }

    pub fn cadence(mut self, value: Cadence) -> Self {
        if let Some(Shape::Text { cadence, .. }) = &mut self.shape {
            *cadence = Some(value);
        }
        self
    }

    /// Camera for labels, instead of the state's text camera.
    pub fn camera(mut self, value: &SharedCamera) -> Self {
        if let Some(Shape::Text { camera, .. }) = &mut self.shape {
            *camera = Some(Arc::downgrade(value));
        }
        self
    }
}

impl Drop for ShapeBuilder<'_> {
    fn drop(&mut self) {
        if let Some(shape) = self.shape.take() {
            self.state.submit(shape, self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::job::JobKind;
    use crate::render::tests::{RecordingSurface, test_camera};

    #[test]
    fn test_builder_submits_on_drop() {
        let mut state = RenderState::default();
        {
            let mut draw = state.draw();
            draw.line(Vec3::ZERO, Vec3::X);
            draw.dotted_line(Vec3::ZERO, Vec3::Y).dash_length(0.5);
            draw.point(Vec3::ONE).size(0.3).color(Color::RED);
        }
        let jobs = state.queue().jobs();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[1].kind, JobKind::DottedLine { dash_length: 0.5 });
        assert_eq!(jobs[2].kind, JobKind::Point { size: 0.3 });
        assert_eq!(jobs[2].color, Color::RED);
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let mut state = RenderState::default();
        state.draw().dotted_line(Vec3::ZERO, Vec3::X);
        state.draw().point(Vec3::ZERO);
        let settings = state.settings().clone();
        let jobs = state.queue().jobs();
        assert_eq!(
            jobs[0].kind,
            JobKind::DottedLine {
                dash_length: settings.sizes.dash_length
            }
        );
        assert_eq!(
            jobs[1].kind,
            JobKind::Point {
                size: settings.sizes.point_size
            }
        );
        assert_eq!(jobs[1].color, settings.colors.point);
    }

    #[test]
    fn test_irrelevant_setters_are_ignored() {
        let mut state = RenderState::default();
        state.draw().line(Vec3::ZERO, Vec3::X).size(5.0).solid().closed();
        assert_eq!(state.queue().jobs()[0].kind, JobKind::Line);
    }

    #[test]
    fn test_circle_segments_override() {
        let mut state = RenderState::default();
        state.draw().circle(Vec3::ZERO, Vec3::Z, 1.0).segments(4);
        let job = &state.queue().jobs()[0];
        assert_eq!(job.kind, JobKind::PolylineMesh);
        assert_eq!(job.vertices.len(), 8);
        for v in &job.vertices {
            assert_relative_eq!(v.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_every_call_enqueues_and_renders() {
        let mut state = RenderState::default();
        {
            let mut draw = state.draw();
            draw.point(Vec3::ZERO);
            draw.line(Vec3::ZERO, Vec3::X);
            draw.dotted_line(Vec3::ZERO, Vec3::X);
            draw.ray(Vec3::ZERO, Vec3::Y);
            draw.arrow(Vec3::ZERO, Vec3::Z).tip(0.2, 0.4);
            draw.triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
            draw.polyline([Vec3::ZERO, Vec3::X, Vec3::Y]).closed();
            draw.circle(Vec3::ZERO, Vec3::Y, 1.0);
            draw.arc(Vec3::ZERO, Vec3::Y, Vec3::X, 1.5, 1.0);
            draw.sphere(Vec3::ZERO, 1.0);
            draw.cube(Vec3::ZERO, Vec3::ONE).rotation(Quat::from_rotation_y(0.5));
            draw.wire_box(Vec3::ZERO, Vec3::ONE, Quat::IDENTITY);
            draw.bounds(Vec3::ZERO, Vec3::ONE);
            draw.capsule(Vec3::ZERO, Vec3::Y, 0.25);
            draw.cone(Vec3::ZERO, Vec3::X, 1.0, 0.4);
            draw.diamond(Vec3::ZERO, 0.5).solid();
            draw.diamond(Vec3::ZERO, 0.5);
            draw.axes(Vec3::ZERO, 1.0);
        }
        assert!(state.queue().jobs().iter().all(|j| j.is_well_formed()));

        let camera = test_camera();
        let mut surface = RecordingSurface::default();
        let stats = state.render(Some(&camera), &mut surface);
        assert_eq!(stats.skipped, 0);
        assert!(stats.vertices > 0);
        assert!(state.queue().is_empty());
    }

    #[test]
    fn test_text_routes_to_overlay() {
        let mut state = RenderState::default();
        let camera = test_camera().into_shared();
        state
            .draw()
            .text(Vec3::ZERO, "hello")
            .camera(&camera)
            .cadence(Cadence::Fixed)
            .anchor(LabelAnchor::TopLeft)
            .offset(Vec2::new(4.0, 0.0));

        assert!(state.queue().is_empty());
        let job = &state.text_overlay().jobs(Cadence::Fixed)[0];
        assert_eq!(job.text, "hello");
        assert_eq!(job.anchor, LabelAnchor::TopLeft);
        assert_eq!(job.offset, Vec2::new(4.0, 0.0));
        assert_eq!(job.color, state.settings().colors.text);
    }

    #[test]
    fn test_text_without_camera_is_dropped() {
        let mut state = RenderState::default();
        state.draw().text(Vec3::ZERO, "nowhere");
        assert!(state.text_overlay().is_empty());
    }
}

//! Closed set of drawable shapes and their tessellation into draw jobs.

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::camera::CameraRef;
use crate::color::Color;
use crate::job::DrawJob;
use crate::primitives;
use crate::settings::Settings;
use crate::text::{Cadence, LabelAnchor};

/// A debug shape request. Optional fields fall back to [`Settings`].
#[derive(Debug, Clone)]
pub enum Shape {
    Point {
        position: Vec3,
        size: Option<f32>,
    },
    Line {
        start: Vec3,
        end: Vec3,
    },
    DottedLine {
        start: Vec3,
        end: Vec3,
        dash_length: Option<f32>,
    },
    Ray {
        origin: Vec3,
        direction: Vec3,
    },
    Arrow {
        start: Vec3,
        end: Vec3,
        tip_size: Option<f32>,
        tip_width: Option<f32>,
    },
    /// Solid triangle
    Triangle {
        a: Vec3,
        b: Vec3,
        c: Vec3,
    },
    Polyline {
        points: Vec<Vec3>,
        closed: bool,
    },
    Circle {
        center: Vec3,
        normal: Vec3,
        radius: f32,
    },
    Arc {
        center: Vec3,
        normal: Vec3,
        from: Vec3,
        /// Sweep in radians
        angle: f32,
        radius: f32,
    },
    Sphere {
        center: Vec3,
        radius: f32,
    },
    /// Wire box with orientation
    Cube {
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
    },
    /// Axis-aligned wire box between two corners
    Bounds {
        min: Vec3,
        max: Vec3,
    },
    Capsule {
        start: Vec3,
        end: Vec3,
        radius: f32,
    },
    Cone {
        apex: Vec3,
        direction: Vec3,
        length: f32,
        /// Half-angle in radians
        half_angle: f32,
    },
    Diamond {
        center: Vec3,
        size: f32,
        solid: bool,
    },
    /// Three colored axis lines
    Axes {
        origin: Vec3,
        rotation: Quat,
        length: f32,
    },
    /// Screen-space label anchored to a world position
    Text {
        position: Vec3,
        text: String,
        anchor: LabelAnchor,
        offset: Vec2,
        cadence: Option<Cadence>,
        camera: Option<CameraRef>,
    },
}

/// Per-call overrides shared by every shape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Style {
    pub color: Option<Color>,
    pub transform: Option<Mat4>,
    pub segments: Option<u32>,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Point { .. } => "point",
            Shape::Line { .. } => "line",
            Shape::DottedLine { .. } => "dotted_line",
            Shape::Ray { .. } => "ray",
            Shape::Arrow { .. } => "arrow",
            Shape::Triangle { .. } => "triangle",
            Shape::Polyline { .. } => "polyline",
            Shape::Circle { .. } => "circle",
            Shape::Arc { .. } => "arc",
            Shape::Sphere { .. } => "sphere",
            Shape::Cube { .. } => "cube",
            Shape::Bounds { .. } => "bounds",
            Shape::Capsule { .. } => "capsule",
            Shape::Cone { .. } => "cone",
            Shape::Diamond { .. } => "diamond",
            Shape::Axes { .. } => "axes",
            Shape::Text { .. } => "text",
        }
    }

    /// Default color for the shape's category.
    pub fn default_color(&self, settings: &Settings) -> Color {
        let colors = &settings.colors;
        match self {
            Shape::Point { .. } => colors.point,
            Shape::Line { .. }
            | Shape::DottedLine { .. }
            | Shape::Ray { .. }
            | Shape::Arrow { .. }
            | Shape::Triangle { .. }
            | Shape::Polyline { .. } => colors.line,
            Shape::Circle { .. } | Shape::Arc { .. } => colors.arc,
            Shape::Sphere { .. }
            | Shape::Capsule { .. }
            | Shape::Cone { .. }
            | Shape::Diamond { .. } => colors.sphere,
            Shape::Cube { .. } | Shape::Bounds { .. } => colors.bounds,
            Shape::Axes { .. } => colors.axis_x,
            Shape::Text { .. } => colors.text,
        }
    }

    /// Converts the shape into draw jobs.
    ///
    /// Returns nothing for [`Shape::Text`], which is queued on the text
    /// overlay instead.
    pub fn tessellate(&self, style: &Style, settings: &Settings) -> Vec<DrawJob> {
        let color = style.color.unwrap_or_else(|| self.default_color(settings));
        let counts = &settings.segments;
        let segments = |default: u32| style.segments.unwrap_or(default);
        let placed = |points: Vec<Vec3>, center: Vec3, scale: f32| -> Vec<Vec3> {
            points.into_iter().map(|p| center + p * scale).collect()
        };

        let jobs = match self {
            Shape::Point { position, size } => vec![DrawJob::point(
                *position,
                size.unwrap_or(settings.sizes.point_size),
                color,
            )],
            Shape::Line { start, end } => vec![DrawJob::line(*start, *end, color)],
            Shape::DottedLine {
                start,
                end,
                dash_length,
            } => vec![DrawJob::dotted_line(
                *start,
                *end,
                dash_length.unwrap_or(settings.sizes.dash_length),
                color,
            )],
            Shape::Ray { origin, direction } => {
                vec![DrawJob::line(*origin, *origin + *direction, color)]
            }
            Shape::Arrow {
                start,
                end,
                tip_size,
                tip_width,
            } => {
                let mut jobs = vec![DrawJob::line(*start, *end, color)];
                let shaft = *end - *start;
                if shaft.length_squared() > f32::EPSILON {
                    let tip = primitives::arrow_tip(
                        shaft,
                        tip_width.unwrap_or(settings.sizes.arrow_tip_width),
                    );
                    let size = tip_size.unwrap_or(settings.sizes.arrow_tip_size);
                    jobs.push(DrawJob::line_list(placed(tip, *end, size), color));
                }
                jobs
            }
            Shape::Triangle { a, b, c } => vec![DrawJob::triangle(*a, *b, *c, color)],
            Shape::Polyline { points, closed } => {
                let segments = if *closed {
                    primitives::loop_to_segments(points)
                } else {
                    primitives::strip_to_segments(points)
                };
                line_list(segments, color)
            }
            Shape::Circle {
                center,
                normal,
                radius,
            } => line_list(
                placed(
                    primitives::circle(*normal, segments(counts.circle)),
                    *center,
                    *radius,
                ),
                color,
            ),
            Shape::Arc {
                center,
                normal,
                from,
                angle,
                radius,
            } => line_list(
                placed(
                    primitives::arc(*normal, *from, *angle, segments(counts.arc)),
                    *center,
                    *radius,
                ),
                color,
            ),
            Shape::Sphere { center, radius } => line_list(
                placed(primitives::sphere(segments(counts.sphere)), *center, *radius),
                color,
            ),
            Shape::Cube {
                center,
                half_extents,
                rotation,
            } => line_list(
                placed(primitives::wire_box(*half_extents, *rotation), *center, 1.0),
                color,
            ),
            Shape::Bounds { min, max } => {
                let center = (*min + *max) * 0.5;
                let half = (*max - *min).abs() * 0.5;
                line_list(
                    placed(primitives::wire_box(half, Quat::IDENTITY), center, 1.0),
                    color,
                )
            }
            Shape::Capsule { start, end, radius } => {
                let axis = *end - *start;
                let radius = radius.max(f32::EPSILON);
                let half_length = axis.length() * 0.5 / radius;
                line_list(
                    placed(
                        primitives::capsule(axis, half_length, segments(counts.capsule)),
                        (*start + *end) * 0.5,
                        radius,
                    ),
                    color,
                )
            }
            Shape::Cone {
                apex,
                direction,
                length,
                half_angle,
            } => line_list(
                placed(
                    primitives::cone(*direction, *half_angle, segments(counts.cone)),
                    *apex,
                    *length,
                ),
                color,
            ),
            Shape::Diamond {
                center,
                size,
                solid: true,
            } => primitives::diamond_faces()
                .into_iter()
                .map(|[a, b, c]| {
                    DrawJob::triangle(
                        *center + a * *size,
                        *center + b * *size,
                        *center + c * *size,
                        color,
                    )
                })
                .collect(),
            Shape::Diamond {
                center,
                size,
                solid: false,
            } => line_list(placed(primitives::diamond_edges(), *center, *size), color),
            Shape::Axes {
                origin,
                rotation,
                length,
            } => {
                let colors = &settings.colors;
                [
                    (Vec3::X, colors.axis_x),
                    (Vec3::Y, colors.axis_y),
                    (Vec3::Z, colors.axis_z),
                ]
                .into_iter()
                .map(|(axis, axis_color)| {
                    DrawJob::line(
                        *origin,
                        *origin + *rotation * axis * *length,
                        style.color.unwrap_or(axis_color),
                    )
                })
                .collect()
            }
            Shape::Text { .. } => Vec::new(),
        };

        jobs.into_iter()
            .map(|job| job.with_optional_transform(style.transform))
            .collect()
    }
}

fn line_list(vertices: Vec<Vec3>, color: Color) -> Vec<DrawJob> {
    if vertices.len() < 2 {
        return Vec::new();
    }
    vec![DrawJob::line_list(vertices, color)]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::job::JobKind;

    fn tessellate(shape: Shape) -> Vec<DrawJob> {
        shape.tessellate(&Style::default(), &Settings::default())
    }

    #[test]
    fn test_every_job_is_well_formed() {
        let shapes = vec![
            Shape::Point { position: Vec3::ONE, size: None },
            Shape::Line { start: Vec3::ZERO, end: Vec3::X },
            Shape::DottedLine { start: Vec3::ZERO, end: Vec3::X, dash_length: None },
            Shape::Ray { origin: Vec3::ZERO, direction: Vec3::Y },
            Shape::Arrow { start: Vec3::ZERO, end: Vec3::Z, tip_size: None, tip_width: None },
            Shape::Triangle { a: Vec3::ZERO, b: Vec3::X, c: Vec3::Y },
            Shape::Polyline { points: vec![Vec3::ZERO, Vec3::X, Vec3::Y], closed: true },
            Shape::Circle { center: Vec3::ZERO, normal: Vec3::Y, radius: 2.0 },
            Shape::Arc {
                center: Vec3::ZERO,
                normal: Vec3::Y,
                from: Vec3::X,
                angle: 1.0,
                radius: 1.0,
            },
            Shape::Sphere { center: Vec3::ZERO, radius: 1.0 },
            Shape::Cube { center: Vec3::ZERO, half_extents: Vec3::ONE, rotation: Quat::IDENTITY },
            Shape::Bounds { min: Vec3::ZERO, max: Vec3::ONE },
            Shape::Capsule { start: Vec3::ZERO, end: Vec3::Y * 2.0, radius: 0.5 },
            Shape::Cone { apex: Vec3::ZERO, direction: Vec3::Z, length: 2.0, half_angle: 0.3 },
            Shape::Diamond { center: Vec3::ZERO, size: 1.0, solid: true },
            Shape::Diamond { center: Vec3::ZERO, size: 1.0, solid: false },
            Shape::Axes { origin: Vec3::ZERO, rotation: Quat::IDENTITY, length: 1.0 },
        ];
        for shape in shapes {
            let jobs = tessellate(shape.clone());
            assert!(!jobs.is_empty(), "{} produced no jobs", shape.name());
            assert!(jobs.iter().all(DrawJob::is_well_formed), "{}", shape.name());
        }
    }

    #[test]
    fn test_default_colors_follow_category() {
        let settings = Settings::default();
        let jobs = tessellate(Shape::Sphere { center: Vec3::ZERO, radius: 1.0 });
        assert_eq!(jobs[0].color, settings.colors.sphere);
        let jobs = tessellate(Shape::Bounds { min: Vec3::ZERO, max: Vec3::ONE });
        assert_eq!(jobs[0].color, settings.colors.bounds);
    }

    #[test]
    fn test_style_overrides() {
        let style = Style {
            color: Some(Color::MAGENTA),
            transform: Some(Mat4::from_translation(Vec3::X)),
            segments: Some(4),
        };
        let jobs = Shape::Circle { center: Vec3::ZERO, normal: Vec3::Z, radius: 1.0 }
            .tessellate(&style, &Settings::default());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].color, Color::MAGENTA);
        assert_eq!(jobs[0].vertices.len(), 8);
        assert_eq!(jobs[0].transform, style.transform);
    }

    #[test]
    fn test_circle_is_scaled_and_offset() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let jobs = tessellate(Shape::Circle { center, normal: Vec3::Y, radius: 2.5 });
        for v in &jobs[0].vertices {
            assert_relative_eq!(v.distance(center), 2.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_bounds_corners() {
        let jobs = tessellate(Shape::Bounds { min: Vec3::splat(-1.0), max: Vec3::new(3.0, 1.0, 1.0) });
        let vertices = &jobs[0].vertices;
        assert_eq!(vertices.len(), 24);
        assert!(vertices.iter().any(|v| v.abs_diff_eq(Vec3::new(3.0, 1.0, 1.0), 1e-5)));
        assert!(vertices.iter().any(|v| v.abs_diff_eq(Vec3::splat(-1.0), 1e-5)));
    }

    #[test]
    fn test_solid_diamond_is_triangles() {
        let jobs = tessellate(Shape::Diamond { center: Vec3::ZERO, size: 2.0, solid: true });
        assert_eq!(jobs.len(), 8);
        assert!(jobs.iter().all(|j| j.kind == JobKind::Triangle));
    }

    #[test]
    fn test_zero_length_arrow_has_no_tip() {
        let jobs = tessellate(Shape::Arrow {
            start: Vec3::ONE,
            end: Vec3::ONE,
            tip_size: None,
            tip_width: None,
        });
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn test_axes_use_axis_colors() {
        let settings = Settings::default();
        let jobs = tessellate(Shape::Axes { origin: Vec3::ZERO, rotation: Quat::IDENTITY, length: 2.0 });
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[1].color, settings.colors.axis_y);
        assert_eq!(jobs[2].vertices[1], Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_short_polyline_is_empty() {
        assert!(tessellate(Shape::Polyline { points: vec![Vec3::ONE], closed: false }).is_empty());
    }

    #[test]
    fn test_text_has_no_geometry() {
        let shape = Shape::Text {
            position: Vec3::ZERO,
            text: "x".into(),
            anchor: LabelAnchor::Center,
            offset: Vec2::ZERO,
            cadence: None,
            camera: None,
        };
        assert!(tessellate(shape).is_empty());
    }
}

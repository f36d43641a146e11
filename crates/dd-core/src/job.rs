//! Draw jobs: the unit of work stored in the command queue.

use glam::{Mat4, Vec3};

use crate::color::Color;

/// Immediate-mode primitive topology a job is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Pairs of vertices form independent segments
    Lines,
    /// Triples of vertices form filled triangles
    Triangles,
}

/// Kind tag of a [`DrawJob`], with the per-kind parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobKind {
    /// A single position drawn as a three-axis cross of half-size `size`
    Point { size: f32 },
    /// A straight segment between two vertices
    Line,
    /// A segment split into dashes at draw time
    DottedLine { dash_length: f32 },
    /// A filled triangle
    Triangle,
    /// Any number of segments, stored as endpoint pairs
    PolylineMesh,
}

/// Number of vertices a job kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// At least two vertices, in pairs
    Pairs,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Pairs => count >= 2 && count % 2 == 0,
        }
    }
}

impl JobKind {
    pub fn arity(&self) -> Arity {
        match self {
            JobKind::Point { .. } => Arity::Exact(1),
            JobKind::Line | JobKind::DottedLine { .. } => Arity::Exact(2),
            JobKind::Triangle => Arity::Exact(3),
            JobKind::PolylineMesh => Arity::Pairs,
        }
    }

    /// The draw mode this kind is rendered with.
    pub fn mode(&self) -> DrawMode {
        match self {
            JobKind::Triangle => DrawMode::Triangles,
            JobKind::Point { .. }
            | JobKind::Line
            | JobKind::DottedLine { .. }
            | JobKind::PolylineMesh => DrawMode::Lines,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Point { .. } => "Point",
            JobKind::Line => "Line",
            JobKind::DottedLine { .. } => "DottedLine",
            JobKind::Triangle => "Triangle",
            JobKind::PolylineMesh => "PolylineMesh",
        }
    }
}

/// A single queued draw request.
///
/// Jobs are plain values owned by the [`crate::CommandQueue`]. The color is
/// stored as submitted; transparency and occlusion factors are applied at
/// render time.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawJob {
    pub kind: JobKind,
    pub vertices: Vec<Vec3>,
    pub color: Color,
    /// Local-to-world transform; identity when `None`
    pub transform: Option<Mat4>,
}

impl DrawJob {
    pub fn point(position: Vec3, size: f32, color: Color) -> Self {
        Self::new(JobKind::Point { size }, vec![position], color)
    }

    pub fn line(start: Vec3, end: Vec3, color: Color) -> Self {
        Self::new(JobKind::Line, vec![start, end], color)
    }

    pub fn dotted_line(start: Vec3, end: Vec3, dash_length: f32, color: Color) -> Self {
        Self::new(JobKind::DottedLine { dash_length }, vec![start, end], color)
    }

    pub fn triangle(a: Vec3, b: Vec3, c: Vec3, color: Color) -> Self {
        Self::new(JobKind::Triangle, vec![a, b, c], color)
    }

    /// Segments given as line-list endpoint pairs.
    pub fn line_list(vertices: Vec<Vec3>, color: Color) -> Self {
        Self::new(JobKind::PolylineMesh, vertices, color)
    }

    fn new(kind: JobKind, vertices: Vec<Vec3>, color: Color) -> Self {
        Self {
            kind,
            vertices,
            color,
            transform: None,
        }
    }

    /// Sets the local-to-world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the transform only if one is given.
    pub fn with_optional_transform(mut self, transform: Option<Mat4>) -> Self {
        if transform.is_some() {
            self.transform = transform;
        }
        self
    }

    /// Returns true if the vertex count matches the kind's arity.
    pub fn is_well_formed(&self) -> bool {
        self.kind.arity().accepts(self.vertices.len())
    }

    /// Transform to apply to the vertices.
    pub fn matrix(&self) -> Mat4 {
        self.transform.unwrap_or(Mat4::IDENTITY)
    }

    /// Vertex positions in world space.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        let matrix = self.matrix();
        self.vertices.iter().map(move |v| matrix.transform_point3(*v))
    }
}

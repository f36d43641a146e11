//! Procedural line geometry for curved and faceted debug shapes.
//!
//! Every generator is a pure function that returns unit-scaled geometry
//! centered on the origin. Line generators return endpoint pairs suitable for
//! a line list (`[a0, b0, a1, b1, ...]`); callers apply offset, scale and
//! orientation.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Quat, Vec3};

/// Threshold above which a normal is treated as parallel to the helper axis.
pub(crate) const PARALLEL_THRESHOLD: f32 = 0.999;

/// Builds a rotation whose local Y axis is `normal`.
///
/// The helper axis is `+Z` unless `normal` is nearly parallel to it, in which
/// case `+Y` is used, so the cross product is never degenerate.
pub fn normal_basis(normal: Vec3) -> Mat3 {
    let n = normal.normalize_or(Vec3::Y);
    let helper = if n.dot(Vec3::Z).abs() > PARALLEL_THRESHOLD {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let x = helper.cross(n).normalize();
    let z = x.cross(n);
    Mat3::from_cols(x, n, z)
}

/// Points of a unit circle lying in the plane perpendicular to `normal`.
///
/// Point `i` is `(sin θ, 0, cos θ)` with `θ = i·360°/segments`, rotated by
/// [`normal_basis`]. The loop is open: the first point is not repeated.
pub fn circle_points(normal: Vec3, segments: u32) -> Vec<Vec3> {
    let basis = normal_basis(normal);
    let segments = segments.max(1);
    (0..segments)
        .map(|i| {
            let theta = i as f32 * TAU / segments as f32;
            basis * Vec3::new(theta.sin(), 0.0, theta.cos())
        })
        .collect()
}

/// Unit circle as line-list endpoint pairs (closed).
pub fn circle(normal: Vec3, segments: u32) -> Vec<Vec3> {
    loop_to_segments(&circle_points(normal, segments))
}

/// Unit arc around `normal`, starting at direction `from` and sweeping
/// `angle` radians counter-clockwise (right-handed about `normal`).
///
/// `from` is projected onto the arc plane; if it is parallel to `normal` the
/// basis X axis is used instead.
pub fn arc(normal: Vec3, from: Vec3, angle: f32, segments: u32) -> Vec<Vec3> {
    let n = normal.normalize_or(Vec3::Y);
    let projected = from - n * from.dot(n);
    let start = projected
        .try_normalize()
        .unwrap_or_else(|| normal_basis(n).x_axis);

    let segments = segments.max(1);
    let points: Vec<Vec3> = (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            Quat::from_axis_angle(n, angle * t) * start
        })
        .collect();
    strip_to_segments(&points)
}

/// Wire sphere: three orthogonal unit circles.
pub fn sphere(segments: u32) -> Vec<Vec3> {
    let mut out = circle(Vec3::X, segments);
    out.extend(circle(Vec3::Y, segments));
    out.extend(circle(Vec3::Z, segments));
    out
}

/// Wire capsule of radius 1 along `axis`.
///
/// `half_length` is the distance from the center to each cap's circle, in
/// units of the radius. The result contains two end circles, four 180° end
/// caps and four longitudinal lines.
pub fn capsule(axis: Vec3, half_length: f32, segments: u32) -> Vec<Vec3> {
    let basis = normal_basis(axis);
    let up = basis.y_axis;
    let top = up * half_length;
    let bottom = -top;
    let half_segments = (segments / 2).max(1);

    let mut out = Vec::new();

    // End circles
    for center in [top, bottom] {
        out.extend(circle(up, segments).into_iter().map(|p| p + center));
    }

    // End caps: two half circles per end, in the two planes containing the axis
    for side in [basis.x_axis, basis.z_axis] {
        let plane_normal = side.cross(up);
        out.extend(
            arc(plane_normal, side, PI, half_segments)
                .into_iter()
                .map(|p| p + top),
        );
        out.extend(
            arc(plane_normal, -side, PI, half_segments)
                .into_iter()
                .map(|p| p + bottom),
        );
    }

    // Longitudinal lines
    for offset in [basis.x_axis, -basis.x_axis, basis.z_axis, -basis.z_axis] {
        out.push(top + offset);
        out.push(bottom + offset);
    }

    out
}

/// Intersects a ray with a plane, returning the ray parameter of the hit.
pub fn ray_plane_intersection(
    origin: Vec3,
    direction: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = plane_normal.dot(direction);
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let t = (plane_point - origin).dot(plane_normal) / denom;
    (t >= 0.0).then_some(t)
}

/// Wire cone with its apex at the origin, opening along `direction` with the
/// given half-angle (radians) and a length of 1.
///
/// Four rays leave the apex, rotated by the half-angle around the two
/// perpendicular basis axes, and stop where they hit the far cap plane. The
/// silhouette is approximated by the cap circle and a circle halfway along.
pub fn cone(direction: Vec3, half_angle: f32, segments: u32) -> Vec<Vec3> {
    let basis = normal_basis(direction);
    let forward = basis.y_axis;
    let half_angle = half_angle.clamp(0.0, PI * 0.5 - 1e-3);
    let cap_center = forward;

    let mut out = Vec::new();
    let mut cap_radius = 0.0;

    for axis in [basis.x_axis, -basis.x_axis, basis.z_axis, -basis.z_axis] {
        let ray = Quat::from_axis_angle(axis, half_angle) * forward;
        if let Some(t) = ray_plane_intersection(Vec3::ZERO, ray, cap_center, forward) {
            let hit = ray * t;
            cap_radius = (hit - cap_center).length();
            out.push(Vec3::ZERO);
            out.push(hit);
        }
    }

    for (distance, radius) in [(1.0, cap_radius), (0.5, cap_radius * 0.5)] {
        let center = forward * distance;
        out.extend(
            circle(forward, segments)
                .into_iter()
                .map(|p| center + p * radius),
        );
    }

    out
}

/// Corner offsets of a box with the given half extents and orientation.
///
/// Corners are indexed by bit pattern: bit 0 = +X, bit 1 = +Y, bit 2 = +Z.
pub fn box_corners(half_extents: Vec3, rotation: Quat) -> [Vec3; 8] {
    std::array::from_fn(|i| {
        let sign = Vec3::new(
            if i & 1 != 0 { 1.0 } else { -1.0 },
            if i & 2 != 0 { 1.0 } else { -1.0 },
            if i & 4 != 0 { 1.0 } else { -1.0 },
        );
        rotation * (half_extents * sign)
    })
}

/// The 12 edges of a box as 24 line-list endpoints.
pub fn wire_box(half_extents: Vec3, rotation: Quat) -> Vec<Vec3> {
    let corners = box_corners(half_extents, rotation);
    let mut out = Vec::with_capacity(24);
    for i in 0..8usize {
        for bit in [1usize, 2, 4] {
            // Each edge is emitted once, from the corner with the bit cleared
            if i & bit == 0 {
                out.push(corners[i]);
                out.push(corners[i | bit]);
            }
        }
    }
    out
}

/// The six axis-aligned tips of a unit diamond (octahedron).
pub const DIAMOND_TIPS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// The 8 triangular faces of a unit diamond, wound counter-clockwise when
/// viewed from outside.
pub fn diamond_faces() -> [[Vec3; 3]; 8] {
    std::array::from_fn(|i| {
        let x = if i & 1 != 0 { Vec3::X } else { Vec3::NEG_X };
        let y = if i & 2 != 0 { Vec3::Y } else { Vec3::NEG_Y };
        let z = if i & 4 != 0 { Vec3::Z } else { Vec3::NEG_Z };
        // Octants with an odd number of negative axes need flipped winding
        let negatives = (i & 1 == 0) as u32 + (i & 2 == 0) as u32 + (i & 4 == 0) as u32;
        if negatives % 2 == 0 {
            [x, y, z]
        } else {
            [x, z, y]
        }
    })
}

/// The 12 edges of a unit diamond as line-list endpoints.
pub fn diamond_edges() -> Vec<Vec3> {
    let mut out = Vec::with_capacity(24);
    for (i, a) in DIAMOND_TIPS.iter().enumerate() {
        for b in &DIAMOND_TIPS[i + 1..] {
            // Opposite tips are not connected
            if a.dot(*b) > -0.5 {
                out.push(*a);
                out.push(*b);
            }
        }
    }
    out
}

/// Three-axis cross with unit arms, used to draw points.
pub fn cross() -> Vec<Vec3> {
    vec![
        Vec3::NEG_X,
        Vec3::X,
        Vec3::NEG_Y,
        Vec3::Y,
        Vec3::NEG_Z,
        Vec3::Z,
    ]
}

/// Arrow tip for a shaft pointing along `direction`, with the tip at the
/// origin and length 1. `width` is the half-width relative to the length.
pub fn arrow_tip(direction: Vec3, width: f32) -> Vec<Vec3> {
    let basis = normal_basis(direction);
    let back = -basis.y_axis;
    let mut out = Vec::with_capacity(8);
    for side in [basis.x_axis, -basis.x_axis, basis.z_axis, -basis.z_axis] {
        out.push(Vec3::ZERO);
        out.push(back + side * width);
    }
    out
}

/// Converts a closed loop of points into line-list pairs.
pub fn loop_to_segments(points: &[Vec3]) -> Vec<Vec3> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        out.push(points[i]);
        out.push(points[(i + 1) % n]);
    }
    out
}

/// Converts an open strip of points into line-list pairs.
pub fn strip_to_segments(points: &[Vec3]) -> Vec<Vec3> {
    points
        .windows(2)
        .flat_map(|pair| [pair[0], pair[1]])
        .collect()
}

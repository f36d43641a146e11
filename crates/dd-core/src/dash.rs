//! Dash tessellation for dotted lines.
//!
//! A segment `a → b` of length `L` is split into `ceil(L / dash)`
//! sub-intervals of length `dash` (the last one clipped at `b`). Even
//! intervals are drawn, odd intervals are gaps. A segment never splits into
//! more than [`MAX_DASHES`] intervals; past that the dashes stretch.

use glam::Vec3;

/// Upper bound on sub-intervals per dotted line.
pub const MAX_DASHES: usize = 4096;

/// Number of sub-intervals (dashes plus gaps) covering a segment.
///
/// Returns 0 for zero-length segments and for non-positive or non-finite
/// dash lengths, and at most [`MAX_DASHES`].
pub fn dash_count(length: f32, dash_length: f32) -> usize {
    if !(dash_length > 0.0 && dash_length.is_finite()) || !(length > 0.0 && length.is_finite()) {
        return 0;
    }
    // The ratio may overflow to infinity for tiny dash lengths
    (length / dash_length).ceil().min(MAX_DASHES as f32) as usize
}

/// Iterator over the visible sub-segments of a dotted line.
#[derive(Debug, Clone)]
pub struct Dashes {
    start: Vec3,
    end: Vec3,
    step: f32,
    index: usize,
    count: usize,
}

impl Iterator for Dashes {
    type Item = (Vec3, Vec3);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.count {
            let i = self.index;
            self.index += 1;
            if i % 2 != 0 {
                continue;
            }
            let t0 = (i as f32 * self.step).min(1.0);
            let t1 = ((i + 1) as f32 * self.step).min(1.0);
            return Some((self.start.lerp(self.end, t0), self.start.lerp(self.end, t1)));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Even indices in `index..count`
        let visible = self
            .count
            .div_ceil(2)
            .saturating_sub(self.index.min(self.count).div_ceil(2));
        (visible, Some(visible))
    }
}

/// Visible dashes of the segment `start → end`.
pub fn dashes(start: Vec3, end: Vec3, dash_length: f32) -> Dashes {
    let length = start.distance(end);
    let count = dash_count(length, dash_length);
    let step = if count > 0 {
        (dash_length / length).max(1.0 / count as f32)
    } else {
        0.0
    };
    Dashes {
        start,
        end,
        step,
        index: 0,
        count,
    }
}

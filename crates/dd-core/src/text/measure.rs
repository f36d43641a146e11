//! Text extent measurement.

use glam::Vec2;

/// Measures the pixel extent of plain (markup-free) text.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Vec2;
}

/// Fixed-advance estimate used when no font metrics are available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        let lines = text.split('\n');
        let (count, widest) = lines.fold((0usize, 0usize), |(n, w), line| {
            (n + 1, w.max(line.chars().count()))
        });
        Vec2::new(
            widest as f32 * self.char_width,
            count as f32 * self.line_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_estimate() {
        let m = MonospaceMeasure::default();
        assert_eq!(m.measure("abcd"), Vec2::new(28.0, 14.0));
        assert_eq!(m.measure("ab\nabcdef"), Vec2::new(42.0, 28.0));
        assert_eq!(m.measure(""), Vec2::new(0.0, 14.0));
    }
}

//! Process-wide debug-draw settings.
//!
//! Settings are read by every component of the pipeline but never written by
//! it. Hosts load them from RON (see [`Settings::from_ron_str`]) and hand them
//! to [`crate::RenderState`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// Errors produced while loading or validating settings.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Default colors per primitive category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultColors {
    pub point: Color,
    pub line: Color,
    pub arc: Color,
    pub sphere: Color,
    pub bounds: Color,
    pub text: Color,
    /// Label background behind text overlays
    pub text_background: Color,
    pub axis_x: Color,
    pub axis_y: Color,
    pub axis_z: Color,
}

impl Default for DefaultColors {
    fn default() -> Self {
        Self {
            point: Color::YELLOW,
            line: Color::WHITE,
            arc: Color::CYAN,
            sphere: Color::rgb(0.0, 0.7, 1.0),
            bounds: Color::ORANGE,
            text: Color::WHITE,
            text_background: Color::rgba(0.08, 0.08, 0.1, 0.78),
            axis_x: Color::RED,
            axis_y: Color::GREEN,
            axis_z: Color::BLUE,
        }
    }
}

/// Default sizes (world units unless noted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSizes {
    /// Half-length of each arm of a point cross
    pub point_size: f32,
    /// Length of an arrow tip along the shaft
    pub arrow_tip_size: f32,
    /// Half-width of an arrow tip relative to its length
    pub arrow_tip_width: f32,
    /// Length of one dash (and one gap) of a dotted line
    pub dash_length: f32,
    /// Label padding in pixels
    pub text_padding: f32,
}

impl Default for DefaultSizes {
    fn default() -> Self {
        Self {
            point_size: 0.1,
            arrow_tip_size: 0.25,
            arrow_tip_width: 0.5,
            dash_length: 0.1,
            text_padding: 4.0,
        }
    }
}

/// Tessellation segment counts for curved primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentCounts {
    pub circle: u32,
    pub arc: u32,
    pub sphere: u32,
    pub capsule: u32,
    pub cone: u32,
}

impl Default for SegmentCounts {
    fn default() -> Self {
        Self {
            circle: 32,
            arc: 24,
            sphere: 32,
            capsule: 24,
            cone: 32,
        }
    }
}

/// Complete debug-draw settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub colors: DefaultColors,
    pub sizes: DefaultSizes,
    pub segments: SegmentCounts,
    /// Global alpha multiplier applied at render time
    pub transparency: f32,
    /// Alpha multiplier for geometry hidden behind scene content. A value of
    /// `1.0` disables the occluded pass entirely.
    pub occluded_attenuation: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            colors: DefaultColors::default(),
            sizes: DefaultSizes::default(),
            segments: SegmentCounts::default(),
            transparency: 1.0,
            occluded_attenuation: 0.25,
        }
    }
}

impl Settings {
    /// Returns true if the occluded (see-through) pass should run.
    pub fn occlusion_enabled(&self) -> bool {
        self.occluded_attenuation < 1.0
    }

    /// Parses settings from RON and validates them.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            ron::from_str(source).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Checks that factors, sizes and segment counts are usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_factor("transparency", self.transparency)?;
        check_factor("occluded_attenuation", self.occluded_attenuation)?;

        if !(self.sizes.dash_length.is_finite() && self.sizes.dash_length > 0.0) {
            return Err(SettingsError::Invalid {
                field: "sizes.dash_length",
                reason: format!("must be positive, got {}", self.sizes.dash_length),
            });
        }

        let segments = [
            ("segments.circle", self.segments.circle, 3),
            ("segments.arc", self.segments.arc, 1),
            ("segments.sphere", self.segments.sphere, 3),
            ("segments.capsule", self.segments.capsule, 4),
            ("segments.cone", self.segments.cone, 3),
        ];
        for (field, value, min) in segments {
            if value < min {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be at least {}, got {}", min, value),
                });
            }
        }

        Ok(())
    }
}

fn check_factor(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("must be within 0..=1, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings::default().occlusion_enabled());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut settings = Settings::default();
        settings.transparency = 0.5;
        settings.segments.circle = 12;

        let text = settings.to_ron_string().unwrap();
        let loaded = Settings::from_ron_str(&text).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let loaded = Settings::from_ron_str("(occluded_attenuation: 1.0)").unwrap();
        assert!(!loaded.occlusion_enabled());
        assert_eq!(loaded.segments, SegmentCounts::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Settings::from_ron_str("(transparency: 2.0)").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "transparency",
                ..
            }
        ));

        let mut settings = Settings::default();
        settings.sizes.dash_length = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.segments.circle = 2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Settings::from_ron_str("(transparency: )"),
            Err(SettingsError::Parse(_))
        ));
    }
}

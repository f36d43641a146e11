//! Application configuration
//!
//! Holds the debug-draw settings together with viewer preferences.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use dd_core::Settings;
use serde::{Deserialize, Serialize};

/// Which demo callers run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoScene {
    /// Moving callers plus the static showcase
    #[default]
    Full,
    /// Static shapes only
    Showcase,
    /// The spinning probe and the bouncing marker only
    Moving,
}

impl DemoScene {
    /// Parses a scene name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "showcase" => Some(Self::Showcase),
            "moving" => Some(Self::Moving),
            _ => None,
        }
    }

    pub fn has_showcase(self) -> bool {
        matches!(self, Self::Full | Self::Showcase)
    }

    pub fn has_moving(self) -> bool {
        matches!(self, Self::Full | Self::Moving)
    }
}

/// Viewer preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fixed simulation rate in Hz
    pub fixed_rate: f32,
    /// Show the screen-space label overlay
    pub show_overlays: bool,
    /// Enter play mode on startup
    pub start_playing: bool,
    /// Viewport clear color (RGBA)
    pub background: [f32; 4],
    /// Orbit speed in radians per pixel
    pub orbit_sensitivity: f32,
    /// Zoom factor per scroll pixel
    pub zoom_sensitivity: f32,
    /// Initial window size in points
    pub window_size: [f32; 2],
    /// Demo callers to run
    pub scene: DemoScene,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fixed_rate: 50.0,
            show_overlays: true,
            start_playing: false,
            background: [0.11, 0.11, 0.13, 1.0],
            orbit_sensitivity: 0.008,
            zoom_sensitivity: 0.002,
            window_size: [1280.0, 800.0],
            scene: DemoScene::default(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Debug-draw pipeline settings
    #[serde(default)]
    pub debug_draw: Settings,
    /// Viewer settings
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }

    /// Fixed simulation step in seconds.
    pub fn fixed_step(&self) -> f32 {
        1.0 / self.viewer.fixed_rate.clamp(1.0, 1000.0)
    }
}

//! Debug-draw demo frontend
//!
//! eframe application hosting the debug-draw pipeline in an off-screen wgpu
//! viewport, with play/edit modes and a fixed-rate simulation tick.

mod app;
pub mod config;
mod demo;
mod orbit;
mod viewport;

pub use app::DebugDrawApp;

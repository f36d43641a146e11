//! wgpu backend for the debug-draw pipeline
//!
//! - [`surface::BatchSurface`] - `DrawSurface` that records vertex batches
//!   on the CPU
//! - [`renderer::DebugDrawRenderer`] - Uploads and replays the batches with
//!   one pipeline per primitive mode and depth test
//! - [`scene::SceneRenderer`] - Depth-writing occluders for the host scene
//! - [`context::RenderContext`] - Device, queue, formats and camera uniform
//!
//! # Example
//!
//! ```ignore
//! let mut surface = BatchSurface::new();
//! state.render(Some(&camera), &mut surface);
//! renderer.prepare(&ctx, &mut surface);
//! renderer.render(&mut render_pass);
//! ```

pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod scene;
pub mod surface;
pub mod vertex;

pub use context::{DEPTH_FORMAT, RenderContext};
pub use pipeline::PipelineConfig;
pub use renderer::DebugDrawRenderer;
pub use scene::SceneRenderer;
pub use surface::{Batch, BatchSurface};
pub use vertex::{CameraUniform, DebugVertex};

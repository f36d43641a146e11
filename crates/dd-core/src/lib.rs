//! Deferred debug-draw pipeline
//!
//! Code anywhere in a frame requests transient annotations (lines, wire and
//! solid shapes, text labels); they are queued, then batched and
//! depth-composited once per repaint of the host viewport.
//!
//! # Architecture
//!
//! - [`primitives`] / [`dash`] - Pure tessellation of curved shapes and
//!   dotted lines
//! - [`queue::CommandQueue`] - Jobs accumulated between repaints
//! - [`render::BatchedRenderer`] - Dual-pass occlusion compositing into a
//!   [`render::DrawSurface`]
//! - [`text::TextOverlay`] - World-anchored labels flushed per cadence tick
//! - [`lifecycle`] - Host event hub, state machine and forced resets
//! - [`state::RenderState`] - Composition root, with [`draw::Draw`] as the
//!   inbound API
//!
//! # Example
//!
//! ```
//! use dd_core::{Camera, RenderState};
//! use dd_core::render::DrawSurface;
//! use dd_core::job::DrawMode;
//! use glam::{Mat4, Vec2, Vec3};
//!
//! struct Null;
//! impl DrawSurface for Null {
//!     fn begin_pass(&mut self, _: Mat4, _: dd_core::render::DepthTest) {}
//!     fn begin(&mut self, _: DrawMode) {}
//!     fn vertex(&mut self, _: Vec3, _: dd_core::Color) {}
//!     fn end(&mut self) {}
//! }
//!
//! let mut state = RenderState::default();
//! state.draw().sphere(Vec3::ZERO, 1.0);
//!
//! let camera = Camera::new(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec2::new(640.0, 480.0));
//! let stats = state.render(Some(&camera), &mut Null);
//! assert_eq!(stats.jobs, 1);
//! assert!(state.queue().is_empty());
//! ```

pub mod camera;
pub mod color;
pub mod dash;
pub mod draw;
pub mod job;
pub mod lifecycle;
pub mod primitives;
pub mod queue;
pub mod render;
pub mod settings;
pub mod shape;
pub mod state;
pub mod text;

pub use camera::{Camera, CameraRef, SharedCamera};
pub use color::Color;
pub use draw::{Draw, ShapeBuilder};
pub use job::{DrawJob, DrawMode, JobKind};
pub use lifecycle::{
    EventKind, HostEvent, HostEvents, Installation, LifecycleState, ResetReason, Subscription,
    TickContext, install,
};
pub use queue::CommandQueue;
pub use render::{BatchedRenderer, DepthTest, DrawSurface, RenderStats};
pub use settings::{Settings, SettingsError};
pub use shape::{Shape, Style};
pub use state::RenderState;
pub use text::{
    Cadence, FlushStats, LabelAnchor, LabelPainter, MonospaceMeasure, ScreenLabel, ScreenRect,
    TextJob, TextMeasure, TextOverlay,
};

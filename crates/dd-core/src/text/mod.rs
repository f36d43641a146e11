//! Text overlay projector.
//!
//! Labels are queued in world space and drawn in screen space during the
//! host's GUI ticks. Two independent sub-queues exist: one flushed on every
//! presented frame ([`Cadence::Frame`]) and one flushed on every fixed-rate
//! simulation tick ([`Cadence::Fixed`]). Both are cleared on every tick of
//! their cadence whether or not anything was painted.
//!
//! The overlay subscribes itself to the tick events lazily, on the first
//! queued label, and drops those subscriptions (clearing both sub-queues)
//! as soon as a tick arrives outside of active simulation.

pub mod markup;
pub mod measure;

use glam::{Vec2, Vec3};

use crate::camera::{Camera, CameraRef};
use crate::color::Color;
use crate::settings::Settings;

pub use markup::{MarkupError, TextSpan};
pub use measure::{MonospaceMeasure, TextMeasure};

/// Which host tick flushes a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cadence {
    /// Every presented frame
    #[default]
    Frame,
    /// Every fixed-rate simulation step
    Fixed,
}

/// Point of the label rectangle pinned to the projected position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelAnchor {
    TopLeft,
    #[default]
    Center,
    BottomCenter,
}

/// Axis-aligned screen rectangle in pixels, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }
}

/// A world-space label waiting for its cadence tick.
#[derive(Debug, Clone)]
pub struct TextJob {
    pub position: Vec3,
    pub text: String,
    pub color: Color,
    /// Camera whose viewport the label is drawn into
    pub camera: CameraRef,
    pub anchor: LabelAnchor,
    /// Pixel offset applied after anchoring
    pub offset: Vec2,
}

impl TextJob {
    pub fn new(position: Vec3, text: impl Into<String>, color: Color, camera: CameraRef) -> Self {
        Self {
            position,
            text: text.into(),
            color,
            camera,
            anchor: LabelAnchor::default(),
            offset: Vec2::ZERO,
        }
    }

    pub fn with_anchor(mut self, anchor: LabelAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// A label resolved to screen space, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    /// Background rectangle including padding
    pub rect: ScreenRect,
    pub background: Color,
    /// Top-left corner of the first line of text
    pub text_origin: Vec2,
    pub spans: Vec<TextSpan>,
    /// Color for spans without a markup color
    pub base_color: Color,
}

/// Host GUI hook that paints resolved labels.
pub trait LabelPainter {
    fn paint(&mut self, label: &ScreenLabel);
}

impl LabelPainter for Vec<ScreenLabel> {
    fn paint(&mut self, label: &ScreenLabel) {
        self.push(label.clone());
    }
}

/// Counters from one sub-queue flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub painted: usize,
    /// Behind the camera
    pub culled: usize,
    /// Camera destroyed before the tick
    pub orphaned: usize,
    /// Dropped because overlays were hidden by the host
    pub hidden: usize,
}

/// Projects a world point into a camera's screen space.
///
/// Returns `None` when the point is behind the camera or the camera cannot
/// project it to a finite position.
pub fn project(position: Vec3, camera: &Camera) -> Option<Vec2> {
    let viewport = camera.world_to_viewport(position);
    if viewport.z.is_nan() || viewport.z < 0.0 {
        return None;
    }
    let screen = camera.viewport_to_screen(viewport.truncate());
    screen.is_finite().then_some(screen)
}

/// Computes the background rectangle for a text extent.
pub fn anchor_rect(
    point: Vec2,
    text_size: Vec2,
    padding: f32,
    anchor: LabelAnchor,
    offset: Vec2,
) -> ScreenRect {
    let size = text_size + Vec2::splat(padding * 2.0);
    let min = match anchor {
        LabelAnchor::TopLeft => point,
        LabelAnchor::Center => point - size * 0.5,
        LabelAnchor::BottomCenter => point - Vec2::new(size.x * 0.5, size.y),
    };
    ScreenRect {
        min: min + offset,
        size,
    }
}

/// Two-cadence text overlay.
#[derive(Debug, Default)]
pub struct TextOverlay {
    frame: Vec<TextJob>,
    fixed: Vec<TextJob>,
    registered: bool,
}

impl TextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a label. Returns `true` when this call is the first since the
    /// overlay was last deregistered, meaning tick hooks must be installed.
    pub fn queue(&mut self, cadence: Cadence, job: TextJob) -> bool {
        self.sub_queue_mut(cadence).push(job);
        let first = !self.registered;
        if first {
            tracing::debug!("Text overlay registering for tick events");
            self.registered = true;
        }
        first
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn len(&self, cadence: Cadence) -> usize {
        self.sub_queue(cadence).len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty() && self.fixed.is_empty()
    }

    pub fn jobs(&self, cadence: Cadence) -> &[TextJob] {
        self.sub_queue(cadence)
    }

    /// Clears both sub-queues without changing registration.
    pub fn clear(&mut self) {
        self.frame.clear();
        self.fixed.clear();
    }

    /// Clears both sub-queues and forgets the registration.
    pub fn deregister(&mut self) {
        if self.registered {
            tracing::debug!("Text overlay deregistering from tick events");
        }
        self.clear();
        self.registered = false;
    }

    /// Handles one tick of `cadence`.
    ///
    /// Outside of simulation the overlay deregisters instead of painting.
    /// With overlays hidden the sub-queue is dropped unpainted. Otherwise each
    /// label is projected; labels behind the camera or whose camera is gone
    /// are dropped before any measurement happens.
    pub fn tick(
        &mut self,
        cadence: Cadence,
        simulating: bool,
        overlays_visible: bool,
        settings: &Settings,
        measure: &dyn TextMeasure,
        painter: &mut dyn LabelPainter,
    ) -> FlushStats {
        let mut stats = FlushStats::default();
        if !simulating {
            self.deregister();
            return stats;
        }

        let jobs = std::mem::take(self.sub_queue_mut(cadence));
        if !overlays_visible {
            stats.hidden = jobs.len();
            return stats;
        }

        let padding = settings.sizes.text_padding;
        let background = settings.colors.text_background.fade(settings.transparency);

        for job in jobs {
            let Some(camera) = job.camera.upgrade() else {
                stats.orphaned += 1;
                continue;
            };
            let camera = camera.read();
            let Some(point) = project(job.position, &camera) else {
                stats.culled += 1;
                continue;
            };

            let spans = markup::parse_lossy(&job.text);
            let plain: String = spans.iter().map(|s| s.text.as_str()).collect();
            let rect = anchor_rect(
                point,
                measure.measure(&plain),
                padding,
                job.anchor,
                job.offset,
            );
            painter.paint(&ScreenLabel {
                rect,
                background,
                text_origin: rect.min + Vec2::splat(padding),
                spans,
                base_color: job.color.fade(settings.transparency),
            });
            stats.painted += 1;
        }

        if stats.culled + stats.orphaned > 0 {
            tracing::trace!(?cadence, ?stats, "Text flush dropped labels");
        }
        stats
    }

    fn sub_queue(&self, cadence: Cadence) -> &Vec<TextJob> {
        match cadence {
            Cadence::Frame => &self.frame,
            Cadence::Fixed => &self.fixed,
        }
    }

    fn sub_queue_mut(&mut self, cadence: Cadence) -> &mut Vec<TextJob> {
        match cadence {
            Cadence::Frame => &mut self.frame,
            Cadence::Fixed => &mut self.fixed,
        }
    }
}

//! Off-screen 3D viewport and the egui label overlay.

use std::sync::Arc;

use dd_core::text::TextSpan;
use dd_core::{
    Camera, Color, HostEvent, HostEvents, LabelPainter, RenderState, ScreenLabel, TextMeasure,
};
use dd_renderer::{BatchSurface, DebugDrawRenderer, DebugVertex, RenderContext, SceneRenderer};
use glam::Vec2;

/// Font size of overlay labels.
pub const LABEL_FONT_SIZE: f32 = 13.0;

/// Render texture for viewport
struct RenderTexture {
    view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

/// GPU side of the demo viewport.
pub struct Viewport {
    ctx: RenderContext,
    scene: SceneRenderer,
    debug: DebugDrawRenderer,
    surface: BatchSurface,
    render_texture: Option<RenderTexture>,
}

impl Viewport {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        scene_lines: &[DebugVertex],
        scene_triangles: &[DebugVertex],
    ) -> Self {
        let ctx = RenderContext::new(device, queue, format, 800, 600);
        let mut scene = SceneRenderer::new(&ctx);
        scene.set_geometry(&ctx, scene_lines, scene_triangles);
        let debug = DebugDrawRenderer::new(&ctx);

        Self {
            ctx,
            scene,
            debug,
            surface: BatchSurface::new(),
            render_texture: None,
        }
    }

    /// Ensure the render texture matches the requested size
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let width = width.max(1);
        let height = height.max(1);

        if let Some(rt) = &self.render_texture
            && rt.width == width
            && rt.height == height
        {
            return rt.egui_texture_id;
        }

        if let Some(old) = self.render_texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
        }

        self.ctx.resize(width, height);
        let texture = self.ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewport Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.color_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let egui_texture_id =
            egui_renderer.register_native_texture(self.ctx.device(), &view, wgpu::FilterMode::Linear);

        tracing::debug!("Viewport target resized to {}x{}", width, height);
        self.render_texture = Some(RenderTexture {
            depth_view: self.ctx.create_depth_view(),
            view,
            egui_texture_id,
            width,
            height,
        });
        egui_texture_id
    }

    /// Repaints the viewport: the host repaint event drains the debug queue
    /// into the batch surface, then scene and debug geometry are drawn.
    pub fn render(
        &mut self,
        events: &HostEvents<RenderState>,
        state: &mut RenderState,
        camera: &Camera,
        background: [f32; 4],
    ) {
        events.emit(
            state,
            &mut HostEvent::Repaint {
                camera: Some(camera),
                surface: &mut self.surface,
            },
        );
        self.debug.prepare(&self.ctx, &mut self.surface);
        // Scene geometry shares the camera uniform with the debug passes
        self.ctx
            .update_camera(&dd_renderer::CameraUniform::new(camera.view_projection()));

        let Some(rt) = &self.render_texture else {
            return;
        };

        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        {
            let [r, g, b, a] = background.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &rt.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &rt.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.scene.render(&mut render_pass);
            self.debug.render(&mut render_pass);
        }

        self.ctx.queue().submit(std::iter::once(encoder.finish()));
    }

    /// Batches drawn by the last repaint.
    pub fn batch_count(&self) -> usize {
        self.debug.batch_count()
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    let [r, g, b, a] = color.to_rgba8();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Measures labels with egui's font metrics.
pub struct EguiMeasure<'a> {
    ctx: &'a egui::Context,
    font_id: egui::FontId,
}

impl<'a> EguiMeasure<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self {
            ctx,
            font_id: egui::FontId::proportional(LABEL_FONT_SIZE),
        }
    }
}

impl TextMeasure for EguiMeasure<'_> {
    fn measure(&self, text: &str) -> Vec2 {
        let size = self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), self.font_id.clone(), egui::Color32::WHITE)
                .size()
        });
        Vec2::new(size.x, size.y)
    }
}

/// Labels painted for one cadence, kept until that cadence ticks again.
#[derive(Debug, Default)]
pub struct LabelLayer {
    labels: Vec<ScreenLabel>,
}

impl LabelLayer {
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Paints every label, offset by the viewport's top-left corner.
    pub fn draw(&self, painter: &egui::Painter, origin: egui::Pos2) {
        let font_id = egui::FontId::proportional(LABEL_FONT_SIZE);
        for label in &self.labels {
            let rect = egui::Rect::from_min_size(
                origin + egui::vec2(label.rect.min.x, label.rect.min.y),
                egui::vec2(label.rect.size.x, label.rect.size.y),
            );
            painter.rect_filled(rect, 3.0, to_color32(label.background));

            let mut job = egui::text::LayoutJob::default();
            for span in &label.spans {
                job.append(
                    &span.text,
                    0.0,
                    egui::TextFormat {
                        font_id: font_id.clone(),
                        color: to_color32(span_color(span, label.base_color)),
                        ..Default::default()
                    },
                );
            }
            let galley = painter.layout_job(job);
            let text_pos = origin + egui::vec2(label.text_origin.x, label.text_origin.y);
            painter.galley(text_pos, galley, to_color32(label.base_color));
        }
    }
}

impl LabelPainter for LabelLayer {
    fn paint(&mut self, label: &ScreenLabel) {
        self.labels.push(label.clone());
    }
}

/// Markup colors keep their hue but inherit the label's transparency.
fn span_color(span: &TextSpan, base: Color) -> Color {
    span.color.map_or(base, |c| c.fade(base.a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_color32_roundtrip_opaque() {
        let c = to_color32(Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(c, egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_span_color_inherits_alpha() {
        let base = Color::WHITE.with_alpha(0.5);
        let plain = TextSpan {
            text: "a".into(),
            color: None,
        };
        let tinted = TextSpan {
            text: "b".into(),
            color: Some(Color::RED),
        };
        assert_eq!(span_color(&plain, base), base);
        let c = span_color(&tinted, base);
        assert_eq!(c.a, 0.5);
        assert_eq!(c.r, Color::RED.r);
    }

    #[test]
    fn test_label_layer_collects() {
        let mut layer = LabelLayer::default();
        assert!(layer.is_empty());
        let label = ScreenLabel {
            rect: dd_core::ScreenRect {
                min: Vec2::ZERO,
                size: Vec2::new(10.0, 10.0),
            },
            background: Color::BLACK,
            text_origin: Vec2::splat(2.0),
            spans: Vec::new(),
            base_color: Color::WHITE,
        };
        layer.paint(&label);
        assert_eq!(layer.len(), 1);
        layer.clear();
        assert!(layer.is_empty());
    }
}

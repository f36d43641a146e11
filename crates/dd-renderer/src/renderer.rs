//! GPU replay of recorded debug-draw batches.

use dd_core::{DepthTest, DrawMode};

use crate::context::RenderContext;
use crate::pipeline::{self, PipelineConfig, create_camera_bind_group};
use crate::surface::{Batch, BatchSurface};
use crate::vertex::{CameraUniform, DebugVertex};

const SHADER: &str = include_str!("shaders/debug.wgsl");

/// Initial vertex capacity; the buffer doubles when exceeded.
const INITIAL_VERTEX_CAPACITY: u64 = 4096;

const MODES: [DrawMode; 2] = [DrawMode::Lines, DrawMode::Triangles];
const DEPTHS: [DepthTest; 3] = [DepthTest::Always, DepthTest::Less, DepthTest::Greater];

/// Draws [`BatchSurface`] contents with one pipeline per mode and depth test.
///
/// Debug geometry tests against the scene depth but never writes it, so the
/// occluded pass sees the same depth buffer as the near pass.
pub struct DebugDrawRenderer {
    pipelines: Vec<((DrawMode, DepthTest), wgpu::RenderPipeline)>,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: u64,
    batches: Vec<Batch>,
}

impl DebugDrawRenderer {
    pub fn new(ctx: &RenderContext) -> Self {
        let device = ctx.device();
        let layouts = [ctx.camera_bind_group_layout()];

        let mut pipelines = Vec::with_capacity(MODES.len() * DEPTHS.len());
        for mode in MODES {
            for depth in DEPTHS {
                let label = format!("Debug Draw {:?} {:?}", mode, depth);
                let pipeline = PipelineConfig::new(
                    &label,
                    SHADER,
                    ctx.color_format(),
                    ctx.depth_format(),
                    &layouts,
                )
                .with_vertex_layouts(vec![DebugVertex::layout()])
                .with_topology(pipeline::topology(mode))
                .with_depth_compare(pipeline::compare_function(depth))
                .without_depth_write()
                .build(device);
                pipelines.push(((mode, depth), pipeline));
            }
        }

        let bind_group = create_camera_bind_group(
            device,
            ctx.camera_bind_group_layout(),
            ctx.camera_buffer(),
            "Debug Draw",
        );

        Self {
            pipelines,
            bind_group,
            vertex_buffer: create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY),
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            batches: Vec::new(),
        }
    }

    /// Uploads the recorded vertices and camera, then forgets the recording.
    pub fn prepare(&mut self, ctx: &RenderContext, surface: &mut BatchSurface) {
        self.batches.clear();
        if surface.is_empty() {
            surface.clear();
            return;
        }

        if let Some(view_proj) = surface.view_projection() {
            ctx.update_camera(&CameraUniform::new(view_proj));
        }

        let needed = surface.vertices().len() as u64;
        if needed > self.vertex_capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!(
                "Growing debug vertex buffer {} -> {}",
                self.vertex_capacity,
                capacity
            );
            self.vertex_buffer = create_vertex_buffer(ctx.device(), capacity);
            self.vertex_capacity = capacity;
        }

        ctx.queue().write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(surface.vertices()),
        );
        self.batches.extend_from_slice(surface.batches());
        surface.clear();
    }

    /// Number of batches that the next [`Self::render`] will draw.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.batches.is_empty() {
            return;
        }

        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let mut active: Option<(DrawMode, DepthTest)> = None;
        for batch in &self.batches {
            let key = (batch.mode, batch.depth);
            if active != Some(key) {
                let Some(pipeline) = self.pipeline(key) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                active = Some(key);
            }
            render_pass.draw(batch.vertices.clone(), 0..1);
        }
    }

    fn pipeline(&self, key: (DrawMode, DepthTest)) -> Option<&wgpu::RenderPipeline> {
        self.pipelines
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, pipeline)| pipeline)
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Debug Draw Vertex Buffer"),
        size: capacity * std::mem::size_of::<DebugVertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

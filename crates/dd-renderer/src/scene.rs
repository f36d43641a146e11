//! Static occluder geometry for the host viewport.
//!
//! The debug passes only test depth, so something has to fill the depth
//! buffer first. This draws fixed line and triangle geometry that writes
//! depth, using the same vertex format and camera as the debug renderer.

use wgpu::util::DeviceExt;

use crate::context::RenderContext;
use crate::pipeline::{PipelineConfig, create_camera_bind_group};
use crate::vertex::DebugVertex;

const SHADER: &str = include_str!("shaders/debug.wgsl");

struct Mesh {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Opaque scene geometry drawn before the debug passes.
pub struct SceneRenderer {
    line_pipeline: wgpu::RenderPipeline,
    triangle_pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    lines: Option<Mesh>,
    triangles: Option<Mesh>,
}

impl SceneRenderer {
    pub fn new(ctx: &RenderContext) -> Self {
        let layouts = [ctx.camera_bind_group_layout()];
        // Occluder faces are not consistently wound, so nothing is culled
        let build = |label: &str, topology| {
            PipelineConfig::new(
                label,
                SHADER,
                ctx.color_format(),
                ctx.depth_format(),
                &layouts,
            )
            .with_vertex_layouts(vec![DebugVertex::layout()])
            .with_topology(topology)
            .build(ctx.device())
        };

        Self {
            line_pipeline: build("Scene Lines", wgpu::PrimitiveTopology::LineList),
            triangle_pipeline: build("Scene Triangles", wgpu::PrimitiveTopology::TriangleList),
            bind_group: create_camera_bind_group(
                ctx.device(),
                ctx.camera_bind_group_layout(),
                ctx.camera_buffer(),
                "Scene",
            ),
            lines: None,
            triangles: None,
        }
    }

    /// Replaces the scene geometry.
    pub fn set_geometry(
        &mut self,
        ctx: &RenderContext,
        lines: &[DebugVertex],
        triangles: &[DebugVertex],
    ) {
        self.lines = create_mesh(ctx, "Scene Line Buffer", lines);
        self.triangles = create_mesh(ctx, "Scene Triangle Buffer", triangles);
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        for (pipeline, mesh) in [
            (&self.triangle_pipeline, &self.triangles),
            (&self.line_pipeline, &self.lines),
        ] {
            if let Some(mesh) = mesh {
                render_pass.set_pipeline(pipeline);
                render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                render_pass.draw(0..mesh.count, 0..1);
            }
        }
    }
}

fn create_mesh(ctx: &RenderContext, label: &str, vertices: &[DebugVertex]) -> Option<Mesh> {
    if vertices.is_empty() {
        return None;
    }
    let buffer = ctx
        .device()
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
    Some(Mesh {
        buffer,
        count: vertices.len() as u32,
    })
}

//! Render pipeline builder.

use dd_core::{DepthTest, DrawMode};

/// Builder for the pipelines used by the debug renderer.
pub struct PipelineConfig<'a> {
    label: &'a str,
    shader_source: &'a str,
    format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    vertex_layouts: Vec<wgpu::VertexBufferLayout<'static>>,
    topology: wgpu::PrimitiveTopology,
    depth_compare: wgpu::CompareFunction,
    depth_write: bool,
    blend: Option<wgpu::BlendState>,
}

impl<'a> PipelineConfig<'a> {
    pub fn new(
        label: &'a str,
        shader_source: &'a str,
        format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    ) -> Self {
        Self {
            label,
            shader_source,
            format,
            depth_format,
            bind_group_layouts,
            vertex_layouts: Vec::new(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_compare: wgpu::CompareFunction::Less,
            depth_write: true,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        }
    }

    pub fn with_vertex_layouts(mut self, layouts: Vec<wgpu::VertexBufferLayout<'static>>) -> Self {
        self.vertex_layouts = layouts;
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_depth_compare(mut self, compare: wgpu::CompareFunction) -> Self {
        self.depth_compare = compare;
        self
    }

    /// Keeps the depth test but leaves the depth buffer untouched.
    pub fn without_depth_write(mut self) -> Self {
        self.depth_write = false;
        self
    }

    pub fn build(self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} Shader", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.shader_source.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", self.label)),
            bind_group_layouts: self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", self.label)),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &self.vertex_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: self.depth_write,
                depth_compare: self.depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Creates a bind group exposing the camera uniform buffer.
pub fn create_camera_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Camera Bind Group", label)),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

pub fn topology(mode: DrawMode) -> wgpu::PrimitiveTopology {
    match mode {
        DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

pub fn compare_function(depth: DepthTest) -> wgpu::CompareFunction {
    match depth {
        DepthTest::Always => wgpu::CompareFunction::Always,
        DepthTest::Less => wgpu::CompareFunction::Less,
        DepthTest::Greater => wgpu::CompareFunction::Greater,
    }
}

//! Pointer-connection line rendering.
//!
//! Segments from nearby particles to the pointer are expanded into thin
//! quads on the CPU (there are at most a few hundred per frame) and drawn in
//! one pass, each in its particle's color with alpha from proximity.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::field::Connection;

const INITIAL_CAPACITY: usize = 4096;

/// Half-width of a connection line in pixels.
pub const LINE_HALF_WIDTH: f32 = 0.5;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
    pub alpha: f32,
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: 20,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32,
        },
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Expand connection segments into triangle-list vertices.
///
/// Degenerate (zero-length) segments are dropped.
pub fn tessellate(connections: &[Connection]) -> Vec<LineVertex> {
    let mut vertices = Vec::with_capacity(connections.len() * 6);

    for c in connections {
        let dir = c.to - c.from;
        let len = dir.length();
        if len < f32::EPSILON {
            continue;
        }
        let perp = Vec2::new(-dir.y, dir.x) / len * LINE_HALF_WIDTH;

        let quad = [
            c.from - perp,
            c.from + perp,
            c.to - perp,
            c.from + perp,
            c.to - perp,
            c.to + perp,
        ];
        for corner in quad {
            vertices.push(LineVertex {
                position: corner.to_array(),
                color: c.color.to_array(),
                alpha: c.alpha,
            });
        }
    }

    vertices
}

const SHADER: &str = r#"
struct Viewport {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> viewport: Viewport;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) alpha: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) alpha: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let ndc = vec2<f32>(
        in.position.x / viewport.size.x * 2.0 - 1.0,
        1.0 - in.position.y / viewport.size.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.color = in.color;
    out.alpha = in.alpha;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, in.alpha * 0.5);
}
"#;

/// GPU resources for the connection line pass.
pub struct ConnectionPass {
    pipeline: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl ConnectionPass {
    pub fn new(
        device: &wgpu::Device,
        viewport_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Connection Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Connection Pipeline Layout"),
            bind_group_layouts: &[viewport_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Connection Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertices: create_vertex_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            count: 0,
        }
    }

    /// Tessellate and upload this frame's segments.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        connections: &[Connection],
    ) {
        let vertices = tessellate(connections);
        if vertices.len() > self.capacity {
            self.capacity = vertices.len().next_power_of_two();
            self.vertices = create_vertex_buffer(device, self.capacity);
        }
        queue.write_buffer(&self.vertices, 0, bytemuck::cast_slice(&vertices));
        self.count = vertices.len() as u32;
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, viewport: &wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, viewport, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.count, 0..1);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Connection Vertex Buffer"),
        size: (capacity * std::mem::size_of::<LineVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn segment(from: Vec2, to: Vec2) -> Connection {
        Connection {
            from,
            to,
            color: Vec3::ONE,
            alpha: 0.8,
        }
    }

    #[test]
    fn test_tessellate_six_vertices_per_segment() {
        let connections = [
            segment(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)),
            segment(Vec2::new(10.0, 10.0), Vec2::new(10.0, 50.0)),
        ];
        let vertices = tessellate(&connections);
        assert_eq!(vertices.len(), 12);
        assert!(vertices.iter().all(|v| v.alpha == 0.8));
    }

    #[test]
    fn test_tessellate_skips_degenerate_segments() {
        let p = Vec2::new(42.0, 42.0);
        assert!(tessellate(&[segment(p, p)]).is_empty());
    }

    #[test]
    fn test_tessellate_quad_width() {
        let vertices = tessellate(&[segment(Vec2::ZERO, Vec2::new(10.0, 0.0))]);
        // Horizontal segment: the perpendicular is vertical
        assert_eq!(vertices[0].position[1], -LINE_HALF_WIDTH);
        assert_eq!(vertices[1].position[1], LINE_HALF_WIDTH);
    }
}

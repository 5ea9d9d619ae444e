//! Instanced particle rendering.
//!
//! Each particle becomes one quad instance; the vertex shader rotates and
//! places the quad in pixel space, and the fragment shader cuts the theme's
//! shape out of it. The quad half-extent is twice the particle size so the
//! widest shapes (star tips, heart lobes) fit inside it.

use bytemuck::{Pod, Zeroable};

use crate::particle::Particle;

const INITIAL_CAPACITY: usize = 1024;

/// Per-instance vertex data, one per particle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub angle: f32,
    pub color: [f32; 3],
    pub shape: u32,
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
            angle: p.angle,
            color: p.color.to_array(),
            shape: p.shape.index(),
        }
    }
}

impl ParticleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32,
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32,
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: 28,
            shader_location: 4,
            format: wgpu::VertexFormat::Uint32,
        },
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
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
    @location(1) size: f32,
    @location(2) angle: f32,
    @location(3) color: vec3<f32>,
    @location(4) shape: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) @interpolate(flat) shape: u32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];

    // Half-extent covers the widest shape (star tips at 1.5x, heart lobes).
    let half_extent = in.size * 2.0;
    let rot = mat2x2<f32>(
        vec2<f32>(cos(in.angle), sin(in.angle)),
        vec2<f32>(-sin(in.angle), cos(in.angle)),
    );
    let world = in.position + rot * (quad_pos * half_extent);

    let ndc = vec2<f32>(
        world.x / viewport.size.x * 2.0 - 1.0,
        1.0 - world.y / viewport.size.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.color = in.color;
    out.uv = quad_pos;
    out.shape = in.shape;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Shape space: the particle size maps to unit length.
    let p = in.uv * 2.0;

    switch in.shape {
        case 1u: {
            // Square of side 2x size
            if max(abs(p.x), abs(p.y)) > 1.0 {
                discard;
            }
        }
        case 2u: {
            // Heart: implicit curve (x^2 + y^2 - 1)^3 - x^2 y^3 <= 0,
            // y flipped so the point faces down in screen space
            let h = vec2<f32>(p.x, -p.y) / 1.4;
            let k = h.x * h.x + h.y * h.y - 1.0;
            if k * k * k - h.x * h.x * h.y * h.y * h.y > 0.0 {
                discard;
            }
        }
        case 3u: {
            // 5-point star: radius swings between 0.7x and 1.5x with angle
            let angle = atan2(p.y, p.x);
            let lobe = cos((angle + 1.5707963) * 5.0) * 0.5 + 0.5;
            if length(p) > 0.7 + lobe * 0.8 {
                discard;
            }
        }
        default: {
            // Disc of the particle size
            if length(p) > 1.0 {
                discard;
            }
        }
    }

    return vec4<f32>(in.color, 1.0);
}
"#;

/// GPU resources for the instanced particle pass.
pub struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl ParticlePass {
    pub fn new(
        device: &wgpu::Device,
        viewport_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[viewport_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleInstance::layout()],
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
            instances: create_instance_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            count: 0,
        }
    }

    /// Upload this frame's instances, growing the buffer if the population
    /// outgrew it (e.g. a retheme after resizing into a wider tier).
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, particles: &[Particle]) {
        if particles.len() > self.capacity {
            self.capacity = particles.len().next_power_of_two();
            self.instances = create_instance_buffer(device, self.capacity);
        }

        let data: Vec<ParticleInstance> = particles.iter().map(ParticleInstance::from).collect();
        queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&data));
        self.count = particles.len() as u32;
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, viewport: &wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, viewport, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Particle Instance Buffer"),
        size: (capacity * std::mem::size_of::<ParticleInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ParticleShape, Theme};
    use glam::{Vec2, Vec3};

    #[test]
    fn test_instance_packing() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);

        let particle = Particle {
            position: Vec2::new(10.0, 20.0),
            velocity: Vec2::ZERO,
            angle: 1.0,
            spin: 0.0,
            size: 3.0,
            base_size: 3.0,
            color: Vec3::new(1.0, 0.5, 0.0),
            shape: ParticleShape::Star,
        };

        let instance = ParticleInstance::from(&particle);
        assert_eq!(instance.position, [10.0, 20.0]);
        assert_eq!(instance.size, 3.0);
        assert_eq!(instance.shape, ParticleShape::Star.index());
    }

    #[test]
    fn test_shape_indices_cover_shader_cases() {
        // The fragment shader switches on these exact values
        assert_eq!(ParticleShape::Circle.index(), 0);
        assert_eq!(ParticleShape::Square.index(), 1);
        assert_eq!(ParticleShape::Heart.index(), 2);
        assert_eq!(ParticleShape::Star.index(), 3);
        for theme in Theme::ALL {
            assert!(theme.style().shape.index() <= 3);
        }
    }
}

//! Particle layer.
//!
//! Runs the shooters and fireworks simulation, mirrors the whole ring
//! buffer into one instance buffer every frame, and draws a camera-facing
//! quad per slot. Motion is evaluated in the vertex shader from birth
//! time and direction, so the CPU never integrates positions.

use std::sync::{Arc, Mutex};

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Point3, Result};
use ember_scene::{Fireworks, ParticleBuffer, ParticleRecord, ParticleShooter};

use crate::compositor::RenderLayer;
use crate::context::GpuContext;
use crate::frame::FrameContext;
use crate::layers::{depth_state, primitive_state, uniform_bind_group_layout};
use crate::shaders::PARTICLE_SHADER;

const DEFAULT_EMISSION_RATE: u32 = 2;
const DEFAULT_POINT_SIZE: f32 = 0.05;

/// Handle for requesting firework bursts from outside the layer.
///
/// Clones share one queue. Requests are drained into the simulation on
/// the next drawn frame.
#[derive(Clone, Default)]
pub struct BurstQueue {
    pending: Arc<Mutex<Vec<(Point3, Color)>>>,
}

impl BurstQueue {
    pub fn fire(&self, position: Point3, color: Color) {
        self.pending
            .lock()
            .expect("burst queue poisoned")
            .push((position, color));
    }

    fn drain(&self) -> Vec<(Point3, Color)> {
        std::mem::take(&mut *self.pending.lock().expect("burst queue poisoned"))
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ParticleUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    // x = current time, y = billboard half-size in eye space
    params: [f32; 4],
}

struct ParticleResources {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Additively blended particle billboards fed by shooters and bursts.
pub struct ParticleLayer {
    context: GpuContext,
    buffer: ParticleBuffer,
    shooters: Vec<ParticleShooter>,
    fireworks: Fireworks,
    bursts: BurstQueue,
    rng: Box<dyn FnMut() -> f32 + Send>,
    emission_rate: u32,
    point_size: f32,
    resources: Option<ParticleResources>,
}

impl ParticleLayer {
    /// Creates a layer with a ring of `capacity` particle slots.
    ///
    /// `rng` drives emission scatter and must yield values in `[0, 1)`.
    pub fn new(
        context: GpuContext,
        capacity: usize,
        rng: impl FnMut() -> f32 + Send + 'static,
    ) -> Result<Self> {
        Ok(Self {
            context,
            buffer: ParticleBuffer::new(capacity)?,
            shooters: Vec::new(),
            fireworks: Fireworks::default(),
            bursts: BurstQueue::default(),
            rng: Box::new(rng),
            emission_rate: DEFAULT_EMISSION_RATE,
            point_size: DEFAULT_POINT_SIZE,
            resources: None,
        })
    }

    /// Registers a shooter that emits continuously every frame.
    pub fn with_shooter(mut self, shooter: ParticleShooter) -> Self {
        self.shooters.push(shooter);
        self
    }

    /// Emissions per shooter per frame.
    pub fn with_emission_rate(mut self, rate: u32) -> Self {
        self.emission_rate = rate;
        self
    }

    pub fn with_fireworks(mut self, fireworks: Fireworks) -> Self {
        self.fireworks = fireworks;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    /// Queue handle for triggering bursts from input handlers.
    pub fn burst_queue(&self) -> BurstQueue {
        self.bursts.clone()
    }

    fn create_resources(&self) -> ParticleResources {
        let device = self.context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let bind_group_layout = uniform_bind_group_layout(device, "Particle Bind Group Layout");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Uniform Buffer"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size: (self.buffer.capacity() * std::mem::size_of::<ParticleRecord>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleRecord>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // position_and_birth: vec4<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 0,
                },
                // color: vec4<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 1,
                },
                // direction: vec4<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 32,
                    shader_location: 2,
                },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[instance_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.texture_format(),
                    // Additive: overlapping sparks brighten instead of occluding.
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        ParticleResources {
            pipeline,
            instance_buffer,
            uniform_buffer,
            bind_group,
        }
    }
}

impl RenderLayer<FrameContext> for ParticleLayer {
    fn on_surface_created(&mut self) {
        self.resources = Some(self.create_resources());
    }

    fn on_surface_changed(&mut self, _width: u32, _height: u32) {}

    fn on_draw_frame(&mut self, frame: &mut FrameContext) {
        let Some(resources) = &self.resources else {
            return;
        };

        let params = *frame.params();
        let time = params.time;

        for shooter in &self.shooters {
            shooter.add_particles(&mut self.buffer, time, self.emission_rate, &mut self.rng);
        }
        for (position, color) in self.bursts.drain() {
            self.fireworks
                .burst(&mut self.buffer, position, color, time, &mut self.rng);
        }

        let queue = self.context.queue();
        queue.write_buffer(
            &resources.instance_buffer,
            0,
            bytemuck::cast_slice(self.buffer.records()),
        );

        let uniforms = ParticleUniforms {
            view: params.view.cols,
            projection: params.projection.cols,
            params: [time, self.point_size, 0.0, 0.0],
        };
        queue.write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let pass = frame.pass();
        pass.set_pipeline(&resources.pipeline);
        pass.set_bind_group(0, &resources.bind_group, &[]);
        pass.set_vertex_buffer(0, resources.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.buffer.capacity() as u32);
    }
}

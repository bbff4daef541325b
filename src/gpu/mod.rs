mod bloom;
mod camera;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::scene::Scene;
use crate::shaders::POINT_SHADER;
use crate::starfield::Starfield;
use crate::visuals::{PointStyle, VisualConfig};

use bloom::BloomState;
pub use camera::{CameraConfig, OrbitCamera};

/// Offscreen format the points are accumulated into before bloom.
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointUniforms {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    viewport: [f32; 2],
    time: f32,
    point_size: f32,
    pixel_ratio: f32,
    breathing_amplitude: f32,
    breathing_frequency: f32,
    breathing_speed: f32,
}

/// Per-frame values shared by every batch.
struct FrameParams {
    projection: Mat4,
    view: Mat4,
    viewport: [f32; 2],
    time: f32,
    pixel_ratio: f32,
}

impl PointUniforms {
    fn new(style: &PointStyle, model: Mat4, frame: &FrameParams) -> Self {
        Self {
            projection: frame.projection.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            viewport: frame.viewport,
            time: frame.time,
            point_size: style.base_size,
            pixel_ratio: frame.pixel_ratio,
            breathing_amplitude: style.breathing_amplitude,
            breathing_frequency: style.breathing_frequency,
            breathing_speed: style.breathing_speed,
        }
    }
}

/// Instanced point sprites with positions, colors and scales in separate
/// vertex buffers, plus their own uniforms.
struct PointBatch {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    scales: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
}

impl PointBatch {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        positions: &[Vec3],
        colors: &[Vec3],
        scales: &[f32],
    ) -> Result<Self, GpuError> {
        let count = u32::try_from(positions.len()).map_err(|_| GpuError::TooManyPoints(positions.len()))?;

        let vertex_buffer = |suffix: &str, contents: &[u8], usage: wgpu::BufferUsages| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {suffix}")),
                contents,
                usage,
            })
        };

        let position_buffer = vertex_buffer(
            "Positions",
            bytemuck::cast_slice(positions),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );
        let color_buffer = vertex_buffer("Colors", bytemuck::cast_slice(colors), wgpu::BufferUsages::VERTEX);
        let scale_buffer = vertex_buffer("Scales", bytemuck::cast_slice(scales), wgpu::BufferUsages::VERTEX);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size: std::mem::size_of::<PointUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Bind Group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            positions: position_buffer,
            colors: color_buffer,
            scales: scale_buffer,
            uniform_buffer,
            bind_group,
            count,
        })
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.colors.slice(..));
        pass.set_vertex_buffer(2, self.scales.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}

/// Everything needed to draw a frame: surface, point pipeline, the particle
/// and star batches and the bloom stage.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    particles: PointBatch,
    stars: Option<PointBatch>,
    bloom: BloomState,
    style: PointStyle,
    clear_color: wgpu::Color,
    pixel_ratio: f32,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        stars: Option<&Starfield>,
        visuals: &VisualConfig,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "using GPU adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        tracing::debug!(format = ?surface_format, width = config.width, height = config.height, "surface configured");

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let point_pipeline = create_point_pipeline(&device, &bind_group_layout);

        let particles = PointBatch::new(
            &device,
            &bind_group_layout,
            "Particle",
            scene.positions(),
            scene.colors(),
            scene.scales(),
        )?;
        let stars = stars
            .filter(|s| !s.is_empty())
            .map(|s| PointBatch::new(&device, &bind_group_layout, "Star", &s.positions, &s.colors, &s.scales))
            .transpose()?;

        let bloom = BloomState::new(&device, visuals.bloom, config.width, config.height, surface_format);

        let bg = visuals.background_color;
        let clear_color = wgpu::Color {
            r: bg.x as f64,
            g: bg.y as f64,
            b: bg.z as f64,
            a: 1.0,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline,
            particles,
            stars,
            bloom,
            style: visuals.points,
            clear_color,
            pixel_ratio: scale_factor.min(visuals.points.max_pixel_ratio),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            tracing::debug!(width = new_size.width, height = new_size.height, "surface resized");
            self.bloom.resize(&self.device, new_size.width, new_size.height);
        }
    }

    /// Update the device pixel ratio after a scale factor change.
    pub fn set_pixel_ratio(&mut self, scale_factor: f64) {
        self.pixel_ratio = (scale_factor as f32).min(self.style.max_pixel_ratio);
    }

    /// Upload the live positions and draw one frame.
    pub fn render(&mut self, scene: &Scene, camera: &OrbitCamera, time: f32) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let frame = FrameParams {
            projection: camera.projection_matrix(aspect),
            view: camera.view_matrix(),
            viewport: [self.config.width as f32, self.config.height as f32],
            time,
            pixel_ratio: self.pixel_ratio,
        };

        self.queue
            .write_buffer(&self.particles.positions, 0, bytemuck::cast_slice(scene.positions()));
        let particle_uniforms = PointUniforms::new(&self.style, scene.model_matrix(), &frame);
        self.queue.write_buffer(
            &self.particles.uniform_buffer,
            0,
            bytemuck::bytes_of(&particle_uniforms),
        );

        if let Some(stars) = &self.stars {
            let still = PointStyle {
                breathing_amplitude: 0.0,
                ..self.style
            };
            let star_uniforms = PointUniforms::new(&still, Mat4::IDENTITY, &frame);
            self.queue
                .write_buffer(&stars.uniform_buffer, 0, bytemuck::bytes_of(&star_uniforms));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.scene_view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.point_pipeline);
            if let Some(stars) = &self.stars {
                stars.draw(&mut render_pass);
            }
            self.particles.draw(&mut render_pass);
        }

        self.bloom.encode(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_point_pipeline(device: &wgpu::Device, bind_group_layout: &wgpu::BindGroupLayout) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Point Shader"),
        source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Point Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let instance_buffer = |location: u32, stride: usize, format: wgpu::VertexFormat| {
        (
            stride as wgpu::BufferAddress,
            [wgpu::VertexAttribute {
                offset: 0,
                shader_location: location,
                format,
            }],
        )
    };
    let (position_stride, position_attrs) = instance_buffer(0, std::mem::size_of::<Vec3>(), wgpu::VertexFormat::Float32x3);
    let (color_stride, color_attrs) = instance_buffer(1, std::mem::size_of::<Vec3>(), wgpu::VertexFormat::Float32x3);
    let (scale_stride, scale_attrs) = instance_buffer(2, std::mem::size_of::<f32>(), wgpu::VertexFormat::Float32);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: position_stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &position_attrs,
                },
                wgpu::VertexBufferLayout {
                    array_stride: color_stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &color_attrs,
                },
                wgpu::VertexBufferLayout {
                    array_stride: scale_stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &scale_attrs,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(additive_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        // Additive glow is order independent, so no depth test
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_uniforms_match_wgsl_size() {
        // 3 mat4 + vec2 + 6 scalars
        assert_eq!(std::mem::size_of::<PointUniforms>(), 224);
    }

    #[test]
    fn test_blend_is_additive() {
        let blend = additive_blend();
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn test_vec3_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vec3>(), 12);
    }
}

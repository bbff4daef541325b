//! Bloom post-processing.
//!
//! The scene is rendered into an HDR offscreen texture owned by this module.
//! Each frame then runs:
//!
//! 1. bright pass: scene -> `mips[0]` (half resolution)
//! 2. downsample: `mips[i - 1]` -> `mips[i]`, each level half the last
//! 3. upsample: coarser level tent-filtered and blended over `mips[i]` by
//!    `radius` -> `ups[i]`, from the bottom of the chain back to level 0
//! 4. composite: `scene + ups[0] * intensity` -> surface
//!
//! With bloom disabled only the composite runs, at zero intensity.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::HDR_FORMAT;
use crate::shaders::BLOOM_SHADER;
use crate::visuals::BloomConfig;

/// Deepest mip chain built below the half-resolution bright pass.
const MAX_MIP_LEVELS: usize = 5;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BloomUniforms {
    texel_size: [f32; 2],
    threshold: f32,
    intensity: f32,
    radius: f32,
    _pad: [f32; 3],
}

impl BloomUniforms {
    fn new(config: &BloomConfig, source_size: (u32, u32)) -> Self {
        Self {
            texel_size: [1.0 / source_size.0 as f32, 1.0 / source_size.1 as f32],
            threshold: config.threshold,
            intensity: if config.enabled { config.intensity } else { 0.0 },
            radius: config.radius,
            _pad: [0.0; 3],
        }
    }
}

/// Sizes of the mip chain for a `width` x `height` scene, starting at half
/// resolution and halving until 1x1 or [`MAX_MIP_LEVELS`].
fn mip_sizes(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut sizes = Vec::with_capacity(MAX_MIP_LEVELS);
    let (mut w, mut h) = ((width / 2).max(1), (height / 2).max(1));
    while sizes.len() < MAX_MIP_LEVELS {
        sizes.push((w, h));
        if w == 1 && h == 1 {
            break;
        }
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }
    sizes
}

/// Offscreen targets sized to the window.
struct Targets {
    scene_size: (u32, u32),
    scene_view: wgpu::TextureView,
    sizes: Vec<(u32, u32)>,
    mips: Vec<wgpu::TextureView>,
    // One per level except the coarsest
    ups: Vec<wgpu::TextureView>,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let sizes = mip_sizes(width, height);
        let mips = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| create_target(device, &format!("Bloom Mip {i}"), w, h))
            .collect();
        let ups = sizes[..sizes.len() - 1]
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| create_target(device, &format!("Bloom Upsample {i}"), w, h))
            .collect();
        Self {
            scene_size: (width, height),
            scene_view: create_target(device, "Bloom Scene Texture", width, height),
            sizes,
            mips,
            ups,
        }
    }

    fn view(&self, target: Target) -> &wgpu::TextureView {
        match target {
            Target::Mip(i) => &self.mips[i],
            Target::Up(i) => &self.ups[i],
        }
    }

    /// Top of the chain: the fully blended bloom.
    fn result(&self) -> Target {
        if self.ups.is_empty() {
            Target::Mip(0)
        } else {
            Target::Up(0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Mip(usize),
    Up(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Bright,
    Downsample,
    Upsample,
}

/// One planned fullscreen pass: what it reads and where it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassPlan {
    stage: Stage,
    source: Option<Target>,
    support: Option<Target>,
    output: Target,
}

/// Order of passes for a chain of `levels` mips. A `source` of `None` is the
/// scene texture.
fn plan_passes(levels: usize) -> Vec<PassPlan> {
    let mut plan = vec![PassPlan {
        stage: Stage::Bright,
        source: None,
        support: None,
        output: Target::Mip(0),
    }];
    for i in 1..levels {
        plan.push(PassPlan {
            stage: Stage::Downsample,
            source: Some(Target::Mip(i - 1)),
            support: None,
            output: Target::Mip(i),
        });
    }
    for i in (0..levels.saturating_sub(1)).rev() {
        let coarser = if i + 2 == levels { Target::Mip(i + 1) } else { Target::Up(i + 1) };
        plan.push(PassPlan {
            stage: Stage::Upsample,
            source: Some(coarser),
            support: Some(Target::Mip(i)),
            output: Target::Up(i),
        });
    }
    plan
}

struct Pass {
    label: String,
    stage: Stage,
    output: Target,
    bind_group: wgpu::BindGroup,
    _uniforms: wgpu::Buffer,
}

struct Layouts {
    single: wgpu::BindGroupLayout,
    dual: wgpu::BindGroupLayout,
}

/// GPU resources for the bloom stage.
pub struct BloomState {
    targets: Targets,
    passes: Vec<Pass>,
    composite: Pass,
    sampler: wgpu::Sampler,
    layouts: Layouts,
    bright_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    config: BloomConfig,
}

impl BloomState {
    /// Create the bloom stage for a surface of the given size and format.
    pub fn new(
        device: &wgpu::Device,
        config: BloomConfig,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let targets = Targets::new(device, width, height);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let layouts = Layouts {
            single: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Single Texture Layout"),
                entries: &[texture_entry(0), sampler_entry, uniform_entry],
            }),
            dual: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Dual Texture Layout"),
                entries: &[texture_entry(0), sampler_entry, uniform_entry, texture_entry(3)],
            }),
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });

        let single_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Single Texture Pipeline Layout"),
            bind_group_layouts: &[&layouts.single],
            push_constant_ranges: &[],
        });
        let dual_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Dual Texture Pipeline Layout"),
            bind_group_layouts: &[&layouts.dual],
            push_constant_ranges: &[],
        });

        let bright_pipeline = create_pipeline(device, &single_pipeline_layout, &shader, "fs_bright", HDR_FORMAT);
        let downsample_pipeline =
            create_pipeline(device, &single_pipeline_layout, &shader, "fs_downsample", HDR_FORMAT);
        let upsample_pipeline = create_pipeline(device, &dual_pipeline_layout, &shader, "fs_upsample", HDR_FORMAT);
        let composite_pipeline = create_pipeline(
            device,
            &dual_pipeline_layout,
            &shader,
            "fs_composite",
            surface_format,
        );

        let (passes, composite) = build_passes(device, &targets, &sampler, &layouts, &config);

        Self {
            targets,
            passes,
            composite,
            sampler,
            layouts,
            bright_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            composite_pipeline,
            config,
        }
    }

    /// HDR target the scene should be drawn into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene_view
    }

    /// Recreate the offscreen targets and their bind groups after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = Targets::new(device, width, height);
        let (passes, composite) = build_passes(device, &self.targets, &self.sampler, &self.layouts, &self.config);
        self.passes = passes;
        self.composite = composite;
    }

    /// Record the bloom passes, finishing with the composite into `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        if self.config.enabled {
            for pass in &self.passes {
                let pipeline = match pass.stage {
                    Stage::Bright => &self.bright_pipeline,
                    Stage::Downsample => &self.downsample_pipeline,
                    Stage::Upsample => &self.upsample_pipeline,
                };
                fullscreen_pass(
                    encoder,
                    &pass.label,
                    self.targets.view(pass.output),
                    pipeline,
                    &pass.bind_group,
                );
            }
        }
        fullscreen_pass(
            encoder,
            &self.composite.label,
            output,
            &self.composite_pipeline,
            &self.composite.bind_group,
        );
    }
}

fn build_passes(
    device: &wgpu::Device,
    targets: &Targets,
    sampler: &wgpu::Sampler,
    layouts: &Layouts,
    config: &BloomConfig,
) -> (Vec<Pass>, Pass) {
    let make = |label: String,
                stage: Stage,
                output: Target,
                source: &wgpu::TextureView,
                source_size: (u32, u32),
                support: Option<&wgpu::TextureView>| {
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Uniforms")),
            contents: bytemuck::bytes_of(&BloomUniforms::new(config, source_size)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniforms.as_entire_binding(),
            },
        ];
        if let Some(support) = support {
            entries.push(wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(support),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: if support.is_some() { &layouts.dual } else { &layouts.single },
            entries: &entries,
        });
        Pass {
            label,
            stage,
            output,
            bind_group,
            _uniforms: uniforms,
        }
    };

    let size_of = |target: Target| match target {
        Target::Mip(i) | Target::Up(i) => targets.sizes[i],
    };

    let passes = plan_passes(targets.mips.len())
        .into_iter()
        .enumerate()
        .map(|(n, plan)| {
            let (source, source_size) = match plan.source {
                Some(t) => (targets.view(t), size_of(t)),
                None => (&targets.scene_view, targets.scene_size),
            };
            make(
                format!("Bloom {:?} Pass {n}", plan.stage),
                plan.stage,
                plan.output,
                source,
                source_size,
                plan.support.map(|t| targets.view(t)),
            )
        })
        .collect();

    let result = targets.result();
    let composite = make(
        "Bloom Composite Pass".to_string(),
        Stage::Upsample,
        result,
        &targets.scene_view,
        targets.scene_size,
        Some(targets.view(result)),
    );

    (passes, composite)
}

fn create_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        // vec2 + 6 scalars
        assert_eq!(std::mem::size_of::<BloomUniforms>(), 32);
    }

    #[test]
    fn test_disabled_bloom_zeroes_intensity() {
        let cfg = BloomConfig {
            enabled: false,
            ..Default::default()
        };
        let u = BloomUniforms::new(&cfg, (200, 100));
        assert_eq!(u.intensity, 0.0);
        assert_eq!(u.texel_size, [0.005, 0.01]);
        assert!((u.radius - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_mip_chain_halves_down_to_limit() {
        assert_eq!(
            mip_sizes(1280, 720),
            vec![(640, 360), (320, 180), (160, 90), (80, 45), (40, 22)]
        );
        assert_eq!(mip_sizes(4, 2), vec![(2, 1), (1, 1)]);
        assert_eq!(mip_sizes(1, 1), vec![(1, 1)]);
    }

    #[test]
    fn test_plan_walks_down_then_back_up() {
        let plan = plan_passes(3);
        let stages: Vec<_> = plan.iter().map(|p| p.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::Bright,
                Stage::Downsample,
                Stage::Downsample,
                Stage::Upsample,
                Stage::Upsample,
            ]
        );
        // Coarsest upsample reads the bottom mip, the next one reads its output
        assert_eq!(plan[3].source, Some(Target::Mip(2)));
        assert_eq!(plan[3].support, Some(Target::Mip(1)));
        assert_eq!(plan[3].output, Target::Up(1));
        assert_eq!(plan[4].source, Some(Target::Up(1)));
        assert_eq!(plan[4].output, Target::Up(0));
    }

    #[test]
    fn test_single_level_plan_is_bright_only() {
        let plan = plan_passes(1);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].stage, Stage::Bright);
        assert_eq!(plan[0].source, None);
    }
}

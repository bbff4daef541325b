//! WGSL sources for the render pipeline.
//!
//! [`POINT_SHADER`] draws every particle (and star) as an instanced quad whose
//! pixel size follows `base * scale * pixel_ratio / -view_z`, with a radial
//! `(1 - d)^3` glow meant for additive blending. [`BLOOM_SHADER`] holds the
//! fullscreen bright-pass, separable blur and composite stages.
//!
//! The formulas match the CPU versions in [`crate::visuals`].

/// Point-sprite vertex and fragment stages.
///
/// Bindings: `@group(0) @binding(0)` point uniforms. Vertex inputs: position
/// (location 0), color (1) and scale (2), all per instance.
pub const POINT_SHADER: &str = r#"
struct PointUniforms {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    viewport: vec2<f32>,
    time: f32,
    point_size: f32,
    pixel_ratio: f32,
    breathing_amplitude: f32,
    breathing_frequency: f32,
    breathing_speed: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: PointUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) scale: f32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    var model_position = uniforms.model * vec4<f32>(position, 1.0);

    // Breathing: y follows x first, then x follows z
    let t = uniforms.time * uniforms.breathing_speed;
    let f = uniforms.breathing_frequency;
    let a = uniforms.breathing_amplitude;
    model_position.y += sin(t + model_position.x * f) * a;
    model_position.x += cos(t + model_position.z * f) * a;

    let view_position = uniforms.view * model_position;
    var clip_pos = uniforms.projection * view_position;

    // Diameter in pixels, shrinking with distance
    let size = uniforms.point_size * scale * uniforms.pixel_ratio * (1.0 / -view_position.z);
    let half_extent = size / uniforms.viewport;
    clip_pos.x += quad_pos.x * half_extent.x * clip_pos.w;
    clip_pos.y += quad_pos.y * half_extent.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.color = color;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // uv spans [-1, 1]; point-coordinate distance spans [0, 0.5] to the edge
    let dist = length(in.uv) * 0.5;
    let strength = pow(1.0 - dist, 3.0);
    return vec4<f32>(in.color * strength, strength);
}
"#;

/// Bloom post-process stages.
///
/// The bright pass feeds a chain of half-size mip levels. Each downsample uses
/// a 13-tap filter; each upsample tent-filters the coarser level and blends it
/// over the finer one by `radius`. The composite adds the top of the chain back
/// onto the scene.
///
/// Bindings: 0 source texture, 1 sampler, 2 bloom uniforms, 3 second texture
/// (the finer mip level when upsampling, the bloom result when compositing).
pub const BLOOM_SHADER: &str = r#"
struct BloomUniforms {
    texel_size: vec2<f32>,
    threshold: f32,
    intensity: f32,
    radius: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var source_texture: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> bloom: BloomUniforms;
@group(0) @binding(3) var support_texture: texture_2d<f32>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32((vertex_index << 1u) & 2u);
    let y = f32(vertex_index & 2u);
    out.position = vec4<f32>(x * 2.0 - 1.0, y * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, 1.0 - y);
    return out;
}

fn luminance(color: vec3<f32>) -> f32 {
    return dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
}

fn tap(uv: vec2<f32>, offset: vec2<f32>) -> vec3<f32> {
    return textureSampleLevel(source_texture, source_sampler, uv + offset * bloom.texel_size, 0.0).rgb;
}

@fragment
fn fs_bright(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSampleLevel(source_texture, source_sampler, in.uv, 0.0).rgb;
    let keep = smoothstep(bloom.threshold, bloom.threshold + 0.1, luminance(color));
    return vec4<f32>(color * keep, 1.0);
}

@fragment
fn fs_downsample(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    let center = tap(uv, vec2<f32>(0.0, 0.0));
    let corners = tap(uv, vec2<f32>(-2.0, 2.0)) + tap(uv, vec2<f32>(2.0, 2.0))
        + tap(uv, vec2<f32>(-2.0, -2.0)) + tap(uv, vec2<f32>(2.0, -2.0));
    let edges = tap(uv, vec2<f32>(0.0, 2.0)) + tap(uv, vec2<f32>(-2.0, 0.0))
        + tap(uv, vec2<f32>(2.0, 0.0)) + tap(uv, vec2<f32>(0.0, -2.0));
    let inner = tap(uv, vec2<f32>(-1.0, 1.0)) + tap(uv, vec2<f32>(1.0, 1.0))
        + tap(uv, vec2<f32>(-1.0, -1.0)) + tap(uv, vec2<f32>(1.0, -1.0));
    let color = center * 0.125 + corners * 0.03125 + edges * 0.0625 + inner * 0.125;
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_upsample(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    // 3x3 tent: 1 2 1 / 2 4 2 / 1 2 1
    var coarser = tap(uv, vec2<f32>(0.0, 0.0)) * 4.0;
    coarser += (tap(uv, vec2<f32>(-1.0, 0.0)) + tap(uv, vec2<f32>(1.0, 0.0))
        + tap(uv, vec2<f32>(0.0, -1.0)) + tap(uv, vec2<f32>(0.0, 1.0))) * 2.0;
    coarser += tap(uv, vec2<f32>(-1.0, -1.0)) + tap(uv, vec2<f32>(1.0, -1.0))
        + tap(uv, vec2<f32>(-1.0, 1.0)) + tap(uv, vec2<f32>(1.0, 1.0));
    coarser = coarser / 16.0;
    let current = textureSampleLevel(support_texture, source_sampler, uv, 0.0).rgb;
    return vec4<f32>(mix(current, coarser, bloom.radius), 1.0);
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSampleLevel(source_texture, source_sampler, in.uv, 0.0).rgb;
    let glow = textureSampleLevel(support_texture, source_sampler, in.uv, 0.0).rgb;
    return vec4<f32>(scene + glow * bloom.intensity, 1.0);
}
"#;

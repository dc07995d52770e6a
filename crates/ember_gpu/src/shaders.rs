//! GPU shaders for the layer stack
//!
//! These shaders render:
//! - Solid-color props (pucks, mallets) and lit heightmap terrain
//! - Instanced particle billboards with gravity and age-based brightness
//! - A procedural sky gradient pinned to the far plane
//! - Fullscreen camera/image backdrops
//! - The segmentation mask overlay with confidence thresholds

/// Solid-color mesh shader for props on the terrain.
pub const SOLID_SHADER: &str = r#"
// ============================================================================
// Ember Solid Shader
// ============================================================================

struct Uniforms {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.mvp * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return uniforms.color;
}
"#;

/// Heightmap terrain shader: one directional light plus an ambient floor,
/// with a mild height tint so ridges read brighter than valleys.
///
/// `light_dir` must already be in model space; the CPU folds the terrain's
/// non-uniform scale into it so normals stay unskewed.
pub const HEIGHTMAP_SHADER: &str = r#"
// ============================================================================
// Ember Heightmap Shader
// ============================================================================

struct Uniforms {
    mvp: mat4x4<f32>,
    // Direction toward the light, model space, w unused
    light_dir: vec4<f32>,
    base_color: vec4<f32>,
    // x = ambient, y = diffuse strength, zw unused
    lighting: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) height: f32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.mvp * vec4<f32>(position, 1.0);
    out.normal = normal;
    out.height = position.y;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let diffuse = max(dot(n, normalize(uniforms.light_dir.xyz)), 0.0) * uniforms.lighting.y;
    let shade = uniforms.lighting.x + diffuse;
    let tint = 0.6 + 0.4 * clamp(in.height, 0.0, 1.0);
    return vec4<f32>(uniforms.base_color.rgb * shade * tint, uniforms.base_color.a);
}
"#;

/// Instanced particle billboard shader.
///
/// Each instance is one particle record. Motion is evaluated entirely on
/// the GPU from the record's birth time: linear flight along the stored
/// direction, a t^2/8 gravity drop, and brightness divided by age so
/// particles flash at birth and fade out. Zeroed (never written) records
/// have age equal to the clock and black color, so they contribute
/// nothing under additive blending.
pub const PARTICLE_SHADER: &str = r#"
// ============================================================================
// Ember Particle Shader
// ============================================================================

struct Uniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    // x = current time in seconds, y = billboard half-size, zw unused
    params: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position_and_birth: vec4<f32>,
    @location(1) color: vec4<f32>,
    @location(2) direction: vec4<f32>,
) -> VertexOutput {
    let quad = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );

    let elapsed = max(uniforms.params.x - position_and_birth.w, 0.0);
    var world = position_and_birth.xyz + direction.xyz * elapsed;
    world.y = world.y - elapsed * elapsed / 8.0;

    let corner = quad[vertex_index] * uniforms.params.y;
    let eye = uniforms.view * vec4<f32>(world, 1.0);

    var out: VertexOutput;
    out.position = uniforms.projection * vec4<f32>(eye.xy + corner, eye.z, eye.w);
    out.uv = quad[vertex_index];
    out.color = color.rgb / max(elapsed, 0.001);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Soft round point; blending is additive so rgb carries the falloff.
    let falloff = 1.0 - smoothstep(0.5, 1.0, length(in.uv));
    return vec4<f32>(in.color * falloff, 1.0);
}
"#;

/// Procedural sky shader.
///
/// The cube is drawn with `z = w` so it lands exactly on the far plane;
/// the pipeline uses a less-or-equal depth compare and no depth writes,
/// letting the scene paint over it everywhere else.
pub const SKYBOX_SHADER: &str = r#"
// ============================================================================
// Ember Skybox Shader
// ============================================================================

struct Uniforms {
    view_projection: mat4x4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) direction: vec3<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let clip = uniforms.view_projection * vec4<f32>(position, 1.0);
    out.position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dir = normalize(in.direction);
    let zenith = vec3<f32>(0.05, 0.09, 0.22);
    let horizon = vec3<f32>(0.75, 0.42, 0.28);
    let ground = vec3<f32>(0.12, 0.10, 0.12);

    let above = pow(clamp(dir.y, 0.0, 1.0), 0.55);
    var color = mix(horizon, zenith, above);
    if (dir.y < 0.0) {
        color = mix(horizon, ground, clamp(-dir.y * 3.0, 0.0, 1.0));
    }
    return vec4<f32>(color, 1.0);
}
"#;

/// Fullscreen textured quad for camera and image backdrops.
///
/// `uv_scale` maps the quad onto the written region of a texture that may
/// be allocated larger than its content.
pub const IMAGE_SHADER: &str = r#"
// ============================================================================
// Ember Image Shader
// ============================================================================

struct Uniforms {
    // xy = content / allocation scale, zw unused
    uv_scale: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var image_texture: texture_2d<f32>;
@group(0) @binding(2) var image_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    let quad = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    let corner = quad[vertex_index];

    var out: VertexOutput;
    out.position = vec4<f32>(corner, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5) * uniforms.uv_scale.xy;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(image_texture, image_sampler, in.uv).rgb, 1.0);
}
"#;

/// Segmentation mask overlay shader.
///
/// Samples per-pixel confidence from a single-channel texture and tints
/// confident regions magenta. Confidence above 0.9 gets a fixed alpha of
/// 128/255; between 0.2 and 0.9 the alpha ramps linearly to meet the fixed
/// value; at or below 0.2 the overlay is fully transparent.
pub const MASK_SHADER: &str = r#"
// ============================================================================
// Ember Mask Shader
// ============================================================================

struct Uniforms {
    // xy = content / allocation scale, zw unused
    uv_scale: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var mask_texture: texture_2d<f32>;
@group(0) @binding(2) var mask_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    let quad = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    let corner = quad[vertex_index];

    var out: VertexOutput;
    out.position = vec4<f32>(corner, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5) * uniforms.uv_scale.xy;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let confidence = textureSample(mask_texture, mask_sampler, in.uv).r;

    var alpha = 0.0;
    if (confidence > 0.9) {
        alpha = 128.0 / 255.0;
    } else if (confidence > 0.2) {
        alpha = (182.9 * confidence - 36.6 + 0.5) / 255.0;
    }
    return vec4<f32>(1.0, 0.0, 1.0, alpha);
}
"#;

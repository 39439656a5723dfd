use crate::render::VERTEX_STRIDE;
use crate::style::{TextStyle, UNIFORM_SIZE};

/// Per-vertex attributes.
///
/// Layout (32 bytes):
///   [0..8]   position: vec2<f32>  (pixel position)
///   [8..16]  uv:       vec2<f32>  (atlas UV)
///   [16..32] color:    vec4<f32>  (straight RGBA)
const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 8,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: 16,
        shader_location: 2,
    },
];

pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

// --- WGSL Shader ---

// One module, three fragment entry points. Each `fs_*` mirrors the function
// of the same look in `style::shading`.
pub(crate) const TEXT_SHADER_SRC: &str = "
struct Uniforms {
    projection: mat4x4<f32>,
    glow_color: vec4<f32>,
    outline_color: vec4<f32>,
    time: f32,
    glow_intensity: f32,
    glow_radius: f32,
    outline_width: f32,
    resolution: vec2<f32>,
    softness: f32,
    light_intensity: f32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var atlas_texture: texture_2d<f32>;
@group(1) @binding(1) var atlas_sampler: sampler;

const METAL: vec3<f32> = vec3<f32>(0.78, 0.76, 0.72);

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.projection * vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    out.color = input.color;
    return out;
}

fn aa_width(fw: f32) -> f32 {
    return max(fw * uniforms.softness, 1e-4);
}

// 1 on and inside the edge, 0 at glow_radius of the field range outside it.
fn falloff(d: f32) -> f32 {
    let outside = max(0.5 - d, 0.0);
    return clamp(1.0 - outside / max(0.5 * uniforms.glow_radius, 1e-3), 0.0, 1.0);
}

// Band of `width` starting at `edge` and going inward.
fn band(d: f32, edge: f32, width: f32, w: f32) -> f32 {
    return smoothstep(edge - w, edge + w, d) - smoothstep(edge + width - w, edge + width + w, d);
}

@fragment
fn fs_standard(input: VertexOutput) -> @location(0) vec4<f32> {
    let d = textureSample(atlas_texture, atlas_sampler, input.uv).r;
    let w = aa_width(fwidth(d));
    let alpha = smoothstep(0.5 - w, 0.5 + w, d);

    let s1 = 0.5 + 0.5 * sin(uniforms.time * 1.5 + input.uv.x * 12.0);
    let s2 = 0.5 + 0.5 * sin(uniforms.time * 0.7 - input.uv.y * 8.0 + input.uv.x * 4.0);
    let shimmer = 0.85 + 0.1 * s1 + 0.05 * s2;

    let light = max(uniforms.light_intensity, 0.0);
    let lit = select(pow(light, 1.2), 0.0, light <= 0.0);
    let rgb = METAL * shimmer * input.color.rgb * lit;
    let a = alpha * input.color.a * lit;
    if (a < 0.05) {
        discard;
    }
    return vec4<f32>(rgb * a, a);
}

@fragment
fn fs_neon(input: VertexOutput) -> @location(0) vec4<f32> {
    let d = textureSample(atlas_texture, atlas_sampler, input.uv).r;
    let w = aa_width(fwidth(d));
    let half_width = uniforms.outline_width;
    let stroke = smoothstep(0.5 - half_width - w, 0.5 - half_width + w, d)
        - smoothstep(0.5 + half_width - w, 0.5 + half_width + w, d);

    let f = falloff(d);
    let f3 = f * f * f;
    let glow = (0.5 * f3 + 0.3 * f3 * f + 0.2 * f3 * f * f) * uniforms.glow_intensity;

    let flicker = 0.95 + 0.05 * sin(30.0 * uniforms.time + 10.0 * input.uv.x);
    let g = uniforms.glow_color;
    let glow_part = glow * g.a * (1.0 - stroke);

    let scale = flicker * input.color.a * uniforms.light_intensity;
    let rgb = (input.color.rgb * stroke + g.rgb * glow_part) * scale;
    let a = clamp(min(stroke + glow_part, 1.0) * scale, 0.0, 1.0);
    if (a < 1e-3) {
        discard;
    }
    return vec4<f32>(rgb, a);
}

@fragment
fn fs_title(input: VertexOutput) -> @location(0) vec4<f32> {
    let d = textureSample(atlas_texture, atlas_sampler, input.uv).r;
    let w = aa_width(fwidth(d)) * 0.5;
    let fill = smoothstep(0.5 - w, 0.5 + w, d);

    let shadow = smoothstep(0.5, 0.55, d) - smoothstep(0.55, 0.7, d);
    let darken = 1.0 - 0.4 * shadow;
    let outline = band(d, 0.52, uniforms.outline_width, w) * uniforms.outline_color.a;

    let gradient = 1.0 - 0.25 * clamp(input.position.y / max(uniforms.resolution.y, 1.0), 0.0, 1.0);
    let base = input.color.rgb * gradient * darken;
    let rgb = base + (uniforms.outline_color.rgb - base) * outline;

    let f = falloff(d);
    let atmosphere = f * f * f * f * 0.15 * uniforms.glow_intensity * (1.0 - fill);
    let fill_a = fill * input.color.a;
    let lit = uniforms.light_intensity;
    let out_rgb = (rgb * fill_a + uniforms.glow_color.rgb * atmosphere) * lit;
    let a = clamp(min(fill_a + atmosphere, 1.0) * lit, 0.0, 1.0);
    if (a < 1e-3) {
        discard;
    }
    return vec4<f32>(out_rgb, a);
}
";

// --- Pipeline creation ---

/// Uniform bind group layout: group(0) binding(0) = the shared uniform block,
/// bound with a dynamic offset (one slot per draw).
pub fn create_uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE as u64),
            },
            count: None,
        }],
    })
}

/// Atlas texture bind group layout: group(1) binding(0) = texture, binding(1) = sampler.
pub fn create_atlas_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("atlas_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Fragment entry point for a look.
pub(crate) fn fragment_entry(style: TextStyle) -> &'static str {
    match style {
        TextStyle::Standard => "fs_standard",
        TextStyle::Neon => "fs_neon",
        TextStyle::Title => "fs_title",
    }
}

/// One pipeline per look, indexed by [`TextStyle::index`].
pub fn create_text_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    uniform_layout: &wgpu::BindGroupLayout,
    atlas_layout: &wgpu::BindGroupLayout,
) -> [wgpu::RenderPipeline; 3] {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("text_shader"),
        source: wgpu::ShaderSource::Wgsl(TEXT_SHADER_SRC.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("text_pipeline_layout"),
        bind_group_layouts: &[uniform_layout, atlas_layout],
        immediate_size: 0,
    });

    TextStyle::ALL.map(|style| create_text_pipeline(device, format, &shader, &pipeline_layout, style))
}

fn create_text_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    style: TextStyle,
) -> wgpu::RenderPipeline {
    let label = format!("text_pipeline_{}", style.name());
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[vertex_buffer_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry(style)),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState {
                    // Premultiplied alpha: shaders output (rgb * a, a)
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

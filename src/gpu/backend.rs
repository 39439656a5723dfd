//! wgpu implementation of [`RenderBackend`].
//!
//! Each frame draws into a caller-provided render pass. Vertex, index and
//! uniform data for every draw of the frame go into disjoint regions of
//! three fixed buffers (per-frame cursors), so `queue.write_buffer` for a
//! later draw never clobbers an earlier one before submission.

use super::GpuState;
use super::atlas::GpuAtlas;
use super::pipeline;
use crate::atlas::SdfAtlas;
use crate::render::{Batch, RenderBackend, RenderError, VERTEX_STRIDE};
use crate::style::{TextStyle, UNIFORM_SIZE, Uniforms};

/// Glyph capacity of the per-frame vertex/index buffers.
pub const FRAME_GLYPHS: u64 = 16384;
/// Uniform slots per frame, one per draw.
pub const MAX_DRAWS_PER_FRAME: u64 = 256;

/// Index bytes per glyph: 6 `u16` indices.
const INDEX_BYTES_PER_GLYPH: u64 = 12;

/// GPU text backend for one color target format.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: [wgpu::RenderPipeline; 3],
    atlas_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Distance between uniform slots (device offset alignment).
    uniform_stride: u64,
    pass: Option<wgpu::RenderPass<'static>>,
    vertex_cursor: u64,
    index_cursor: u64,
    draws: u64,
}

impl GpuBackend {
    pub fn new(gpu: &GpuState, format: wgpu::TextureFormat) -> Self {
        let device = &gpu.device;

        let uniform_layout = pipeline::create_uniform_bind_group_layout(device);
        let atlas_layout = pipeline::create_atlas_bind_group_layout(device);
        let pipelines =
            pipeline::create_text_pipelines(device, format, &uniform_layout, &atlas_layout);

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = (UNIFORM_SIZE as u64).div_ceil(alignment) * alignment;

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_vertex_buffer"),
            size: FRAME_GLYPHS * 4 * VERTEX_STRIDE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_index_buffer"),
            size: FRAME_GLYPHS * INDEX_BYTES_PER_GLYPH,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_uniform_buffer"),
            size: uniform_stride * MAX_DRAWS_PER_FRAME,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE as u64),
                }),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sdf_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            pipelines,
            atlas_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            pass: None,
            vertex_cursor: 0,
            index_cursor: 0,
            draws: 0,
        }
    }

    /// Draws issued in the current frame.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }
}

impl RenderBackend for GpuBackend {
    type Atlas = GpuAtlas;
    type Frame = wgpu::RenderPass<'static>;

    fn upload_atlas(&mut self, atlas: SdfAtlas) -> Result<GpuAtlas, RenderError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if atlas.size() > max {
            return Err(RenderError::AtlasTooLarge {
                size: atlas.size(),
                max,
            });
        }
        let uploaded = GpuAtlas::upload(
            &self.device,
            &self.queue,
            &self.atlas_layout,
            &self.sampler,
            atlas,
        );
        log::info!("gpu: atlas texture {}px resident", uploaded.size());
        Ok(uploaded)
    }

    fn begin(&mut self, frame: wgpu::RenderPass<'static>) {
        self.pass = Some(frame);
        self.vertex_cursor = 0;
        self.index_cursor = 0;
        self.draws = 0;
    }

    fn submit(&mut self, atlas: &GpuAtlas, batch: &Batch, uniforms: &Uniforms, style: TextStyle) {
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        if self.draws >= MAX_DRAWS_PER_FRAME {
            log::warn!("gpu: {MAX_DRAWS_PER_FRAME} draws this frame, dropping draw");
            return;
        }

        let vertices = batch.vertex_bytes();
        let indices = batch.index_bytes();
        let v_len = vertices.len() as u64;
        let i_len = indices.len() as u64;
        if self.vertex_cursor + v_len > self.vertex_buffer.size()
            || self.index_cursor + i_len > self.index_buffer.size()
        {
            log::warn!(
                "gpu: frame glyph budget ({FRAME_GLYPHS}) exhausted, dropping {} glyphs",
                batch.glyph_count()
            );
            return;
        }

        let uniform_offset = self.draws * self.uniform_stride;
        self.queue
            .write_buffer(&self.uniform_buffer, uniform_offset, &uniforms.to_bytes());
        self.queue
            .write_buffer(&self.vertex_buffer, self.vertex_cursor, &vertices);
        self.queue
            .write_buffer(&self.index_buffer, self.index_cursor, &indices);

        pass.set_pipeline(&self.pipelines[style.index()]);
        pass.set_bind_group(0, &self.uniform_bind_group, &[uniform_offset as u32]);
        pass.set_bind_group(1, atlas.bind_group(), &[]);
        pass.set_vertex_buffer(
            0,
            self.vertex_buffer
                .slice(self.vertex_cursor..self.vertex_cursor + v_len),
        );
        pass.set_index_buffer(
            self.index_buffer
                .slice(self.index_cursor..self.index_cursor + i_len),
            wgpu::IndexFormat::Uint16,
        );
        pass.draw_indexed(0..batch.indices().len() as u32, 0, 0..1);

        self.vertex_cursor += v_len;
        self.index_cursor += i_len;
        self.draws += 1;
    }

    fn finish(&mut self) -> Option<wgpu::RenderPass<'static>> {
        self.pass.take()
    }
}

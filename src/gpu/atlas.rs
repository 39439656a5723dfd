//! Distance-field atlas resident in GPU memory.

use crate::atlas::{GlyphSource, GlyphTable, SdfAtlas};

/// One uploaded atlas: an `R8Unorm` texture, its bind group and the glyph
/// table. Immutable after upload.
pub struct GpuAtlas {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    glyphs: GlyphTable,
}

impl GpuAtlas {
    /// Create the texture, copy the field into it and bind it with `sampler`.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        atlas: SdfAtlas,
    ) -> Self {
        let size = atlas.size();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sdf_atlas"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let (pixels, glyphs) = atlas.into_parts();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("atlas: uploaded {size}x{size} texture, {} glyphs", glyphs.len());

        Self {
            texture,
            bind_group,
            glyphs,
        }
    }

    /// Edge length of the texture in pixels.
    pub fn size(&self) -> u32 {
        self.texture.width()
    }

    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl GlyphSource for GpuAtlas {
    fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

//! Off-screen render targets for export.

use std::sync::mpsc;

use super::{ExportError, OffscreenTarget};
use crate::gpu::{GpuBackend, GpuState};
use crate::render::TextRenderer;
use crate::render::software::{Canvas, SoftwareBackend};

/// Round `value` up to a multiple of `alignment` (a power of two).
pub fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

/// Drop the per-row padding a texture-to-buffer copy adds.
pub fn copy_tight_rows(
    mapped: &[u8],
    unpadded_bytes_per_row: u32,
    padded_bytes_per_row: u32,
    height: u32,
) -> Result<Vec<u8>, ExportError> {
    let required_len = padded_bytes_per_row as usize * height as usize;
    if mapped.len() < required_len {
        return Err(ExportError::Readback(format!(
            "mapped frame too small: expected at least {required_len} bytes, got {}",
            mapped.len()
        )));
    }

    let row = unpadded_bytes_per_row as usize;
    let mut frame = Vec::with_capacity(row * height as usize);
    for src in mapped.chunks(padded_bytes_per_row as usize).take(height as usize) {
        frame.extend_from_slice(&src[..row]);
    }
    Ok(frame)
}

/// Renders into an `Rgba8Unorm` texture and reads it back through a
/// mappable buffer, blocking until the GPU is done.
pub struct GpuTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: TextRenderer<GpuBackend>,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    unpadded_bytes_per_row: u32,
    padded_bytes_per_row: u32,
    clear: wgpu::Color,
}

impl GpuTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// `clear` is the straight-alpha background every frame starts from.
    pub fn new(gpu: &GpuState, width: u32, height: u32, clear: [f32; 4]) -> Self {
        let device = &gpu.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("export_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let unpadded_bytes_per_row = width * 4;
        let padded_bytes_per_row =
            align_to(unpadded_bytes_per_row, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("export_readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let [r, g, b, a] = clear.map(f64::from);
        Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            renderer: TextRenderer::new(GpuBackend::new(gpu, Self::FORMAT)),
            texture,
            view,
            readback,
            width,
            height,
            unpadded_bytes_per_row,
            padded_bytes_per_row,
            // Premultiplied, matching the blend state.
            clear: wgpu::Color {
                r: r * a,
                g: g * a,
                b: b * a,
                a,
            },
        }
    }

    pub fn renderer_mut(&mut self) -> &mut TextRenderer<GpuBackend> {
        &mut self.renderer
    }

    fn read_back(&self) -> Result<Vec<u8>, ExportError> {
        let slice = self.readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| ExportError::Readback(e.to_string()))?;

        receiver
            .recv()
            .map_err(|e| ExportError::Readback(e.to_string()))?
            .map_err(|e| ExportError::Readback(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let frame = copy_tight_rows(
            &mapped,
            self.unpadded_bytes_per_row,
            self.padded_bytes_per_row,
            self.height,
        );
        drop(mapped);
        self.readback.unmap();
        frame
    }
}

impl OffscreenTarget for GpuTarget {
    type Renderer = TextRenderer<GpuBackend>;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn capture(
        &mut self,
        time: f32,
        render: &mut dyn FnMut(&mut Self::Renderer, f32),
    ) -> Result<Vec<u8>, ExportError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("export_encoder"),
            });

        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("export_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        self.renderer
            .begin_frame(pass, time, (self.width, self.height));
        render(&mut self.renderer, time);
        log::trace!(
            "export: frame at {time:.3}s issued {} draws",
            self.renderer.backend().draw_count()
        );
        // The pass must end before the encoder records the copy.
        drop(self.renderer.end_frame());

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        self.read_back()
    }
}

/// Renders on the CPU with [`SoftwareBackend`].
pub struct SoftwareTarget {
    renderer: TextRenderer<SoftwareBackend>,
    width: u32,
    height: u32,
    clear: [f32; 4],
}

impl SoftwareTarget {
    pub fn new(width: u32, height: u32, clear: [f32; 4]) -> Self {
        Self {
            renderer: TextRenderer::new(SoftwareBackend::new()),
            width,
            height,
            clear,
        }
    }

    pub fn renderer(&self) -> &TextRenderer<SoftwareBackend> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut TextRenderer<SoftwareBackend> {
        &mut self.renderer
    }
}

impl OffscreenTarget for SoftwareTarget {
    type Renderer = TextRenderer<SoftwareBackend>;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn capture(
        &mut self,
        time: f32,
        render: &mut dyn FnMut(&mut Self::Renderer, f32),
    ) -> Result<Vec<u8>, ExportError> {
        let canvas = Canvas::new(self.width, self.height, self.clear);
        self.renderer
            .begin_frame(canvas, time, (self.width, self.height));
        render(&mut self.renderer, time);
        self.renderer
            .end_frame()
            .map(|canvas| canvas.to_rgba8())
            .ok_or_else(|| ExportError::Readback("software frame was not returned".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_to_rounds_up_to_row_alignment() {
        assert_eq!(align_to(4, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(1920 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 7680);
        assert_eq!(align_to(100 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 512);
    }

    #[test]
    fn copy_tight_rows_strips_padding() {
        let mapped = vec![
            1, 2, 3, 4, 99, 99, 99, 99, // row 1: 4 bytes + 4 bytes pad
            5, 6, 7, 8, 88, 88, 88, 88, // row 2: 4 bytes + 4 bytes pad
        ];
        let tight = copy_tight_rows(&mapped, 4, 8, 2).expect("tight copy");
        assert_eq!(tight, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn copy_tight_rows_handles_already_tight_rows() {
        let mapped = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let tight = copy_tight_rows(&mapped, 4, 4, 2).expect("tight copy");
        assert_eq!(tight, mapped);
    }

    #[test]
    fn copy_tight_rows_rejects_short_buffer() {
        let mapped = vec![0u8; 12];
        assert!(matches!(
            copy_tight_rows(&mapped, 4, 8, 2),
            Err(ExportError::Readback(_))
        ));
    }

    #[test]
    fn software_capture_returns_cleared_frame() {
        let mut target = SoftwareTarget::new(4, 3, [0.0, 0.0, 1.0, 1.0]);
        assert!(target.renderer().fonts().is_empty());
        let pixels = target
            .capture(0.0, &mut |_, _| {})
            .expect("capture");
        assert_eq!(pixels.len(), 4 * 3 * 4);
        assert_eq!(&pixels[..4], &[0, 0, 255, 255]);
    }
}

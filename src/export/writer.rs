//! PNG frame encoder.

use std::path::Path;

use super::{ExportError, FrameWriter};

/// Writes RGBA8 frames as PNG files with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngWriter;

impl FrameWriter for PngWriter {
    fn write_frame(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        path: &Path,
    ) -> Result<(), ExportError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ExportError::Encode {
                path: path.to_path_buf(),
                message: format!("expected {expected} bytes of RGBA8, got {}", pixels.len()),
            });
        }
        image::save_buffer(path, pixels, width, height, image::ExtendedColorType::Rgba8).map_err(
            |e| match e {
                image::ImageError::IoError(source) => ExportError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                other => ExportError::Encode {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            },
        )
    }

    fn extension(&self) -> &str {
        "png"
    }
}

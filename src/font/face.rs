//! swash-backed font face: raw bytes plus the identifiers needed to create
//! transient `FontRef`s for each rasterization call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;
use swash::{CacheKey, FontRef};

use super::{FontError, GlyphBitmap, GlyphRasterizer, LineMetrics};

/// A single parsed font face.
pub struct FontFace {
    /// Raw font file bytes (kept alive for `FontRef` borrowing).
    bytes: Arc<Vec<u8>>,
    /// Byte offset to the font table directory (from `FontRef::from_index`).
    offset: u32,
    /// Unique cache key for `ScaleContext` reuse.
    cache_key: CacheKey,
    /// Where the bytes came from, for diagnostics.
    source: String,
    scale_context: ScaleContext,
}

impl FontFace {
    /// Parse the first face of a font file (`.ttf`, `.otf`, `.ttc`).
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FontError::NotFound(path.display().to_string())
            } else {
                FontError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_bytes(bytes, &path.display().to_string())
    }

    /// Parse font bytes already in memory. `source` is only used in messages.
    pub fn from_bytes(bytes: Vec<u8>, source: &str) -> Result<Self, FontError> {
        let (offset, cache_key) = {
            let fr = FontRef::from_index(&bytes, 0)
                .ok_or_else(|| FontError::Parse(source.to_owned()))?;
            (fr.offset, fr.key)
        };
        log::debug!("font: parsed {source} ({} bytes)", bytes.len());
        Ok(Self {
            bytes: Arc::new(bytes),
            offset,
            cache_key,
            source: source.to_owned(),
            scale_context: ScaleContext::new(),
        })
    }

    /// Resolve a family name (e.g. `"DejaVu Sans"`) or absolute path and parse it.
    pub fn by_name(name: &str) -> Result<Self, FontError> {
        let path = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            super::find_font_by_name(name).ok_or_else(|| FontError::NotFound(name.to_owned()))?
        };
        log::info!("font: '{name}' resolved to {}", path.display());
        Self::from_file(&path)
    }

    /// Human-readable origin of this face (file path or caller label).
    pub fn source(&self) -> &str {
        &self.source
    }

    fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.bytes,
            offset: self.offset,
            key: self.cache_key,
        }
    }
}

impl GlyphRasterizer for FontFace {
    fn rasterize(&mut self, ch: char, px_size: f32) -> Option<GlyphBitmap> {
        // Disjoint borrow: `FontRef` borrows the bytes, the scaler borrows the context.
        let fr = FontRef {
            data: &self.bytes,
            offset: self.offset,
            key: self.cache_key,
        };
        let glyph_id = fr.charmap().map(ch);
        if glyph_id == 0 {
            return None;
        }
        let advance_width = fr.glyph_metrics(&[]).scale(px_size).advance_width(glyph_id);

        let mut scaler = self.scale_context.builder(fr).size(px_size).hint(false).build();
        let Some(image) = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id)
        else {
            // Mapped glyph without an outline (space): metrics only.
            return Some(GlyphBitmap {
                advance_width,
                ..GlyphBitmap::default()
            });
        };

        Some(GlyphBitmap {
            width: image.placement.width as usize,
            height: image.placement.height as usize,
            left: image.placement.left,
            top: image.placement.top,
            advance_width,
            data: image.data,
        })
    }

    fn line_metrics(&self, px_size: f32) -> LineMetrics {
        let m = self.font_ref().metrics(&[]).scale(px_size);
        let ascender = m.ascent;
        let descender = m.descent.abs();
        LineMetrics {
            ascender,
            descender,
            line_height: ascender + descender + m.leading,
        }
    }
}

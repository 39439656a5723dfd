//! Signed-distance-field glyph atlas.
//!
//! Rasterizes printable ASCII at twice the requested point size, packs the
//! bitmaps into one square coverage texture with a shelf packer, then turns
//! the whole texture into a distance field. Glyph metrics are reported back
//! at logical (half raster) scale.
//!
//! The atlas is built once and never mutated. Backends upload the pixels and
//! keep only the [`GlyphTable`].

mod packer;
mod sdf;

pub use sdf::distance_field;

use std::collections::HashMap;

use crate::font::{GlyphBitmap, GlyphRasterizer};
use packer::ShelfPacker;

/// First codepoint baked into every atlas (space).
pub const FIRST_CODEPOINT: char = ' ';
/// Last codepoint baked into every atlas (tilde).
pub const LAST_CODEPOINT: char = '~';

/// Smallest accepted atlas edge in pixels.
pub const MIN_ATLAS_SIZE: u32 = 64;
/// Largest accepted atlas edge in pixels (wgpu's default 2D texture limit).
pub const MAX_ATLAS_SIZE: u32 = 8192;

/// Glyphs are rasterized at this multiple of the requested size.
const RASTER_SCALE: f32 = 2.0;

/// Placement of one glyph in the atlas plus its layout metrics.
///
/// UVs are normalized to `0..1`; every other field is in logical pixels at
/// the atlas point size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphRecord {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub width: f32,
    pub height: f32,
    /// Offset from the pen position to the left edge of the glyph box.
    pub bearing_x: f32,
    /// Offset from the baseline up to the top edge of the glyph box.
    pub bearing_y: f32,
    /// Horizontal pen delta.
    pub advance: f32,
}

impl GlyphRecord {
    /// Whether the record has a drawable box (spaces do not).
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Codepoint lookup table plus the font's vertical metrics.
#[derive(Debug, Clone, Default)]
pub struct GlyphTable {
    glyphs: HashMap<char, GlyphRecord>,
    ascender: f32,
    descender: f32,
    line_height: f32,
}

impl GlyphTable {
    pub fn get(&self, ch: char) -> Option<&GlyphRecord> {
        self.glyphs.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &GlyphRecord)> {
        self.glyphs.iter().map(|(ch, rec)| (*ch, rec))
    }

    pub fn ascender(&self) -> f32 {
        self.ascender
    }

    pub fn descender(&self) -> f32 {
        self.descender
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Anything that exposes a glyph table (CPU atlas, uploaded GPU atlas, ...).
pub trait GlyphSource {
    fn glyphs(&self) -> &GlyphTable;
}

impl GlyphSource for GlyphTable {
    fn glyphs(&self) -> &GlyphTable {
        self
    }
}

/// Atlas generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasParams {
    /// Logical point size; glyphs are rasterized at twice this.
    pub point_size: f32,
    /// Edge length of the square atlas texture in pixels.
    pub atlas_size: u32,
    /// Distance-field search radius in atlas pixels.
    pub spread: u32,
    /// Gap between packed glyph boxes in atlas pixels.
    pub padding: u32,
}

impl Default for AtlasParams {
    fn default() -> Self {
        Self {
            point_size: 64.0,
            atlas_size: 2048,
            spread: 6,
            padding: 2,
        }
    }
}

impl AtlasParams {
    fn validate(&self) -> Result<(), AtlasError> {
        if !(MIN_ATLAS_SIZE..=MAX_ATLAS_SIZE).contains(&self.atlas_size) {
            return Err(AtlasError::InvalidSize(self.atlas_size));
        }
        if !(self.point_size > 0.0 && self.point_size.is_finite()) {
            return Err(AtlasError::InvalidPointSize(self.point_size));
        }
        if self.spread == 0 {
            return Err(AtlasError::ZeroSpread);
        }
        // Field margin plus packing gap on both sides must leave room for a glyph.
        let margins = 2 * (u64::from(self.spread) + u64::from(self.padding));
        if margins >= u64::from(self.atlas_size) {
            return Err(AtlasError::MarginTooLarge {
                spread: self.spread,
                padding: self.padding,
                size: self.atlas_size,
            });
        }
        Ok(())
    }
}

/// Invalid atlas generation parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtlasError {
    #[error("atlas size {0} outside supported range 64..=8192")]
    InvalidSize(u32),
    #[error("point size must be positive and finite, got {0}")]
    InvalidPointSize(f32),
    #[error("distance-field spread must be non-zero")]
    ZeroSpread,
    #[error("spread {spread} and padding {padding} leave no room in a {size}px atlas")]
    MarginTooLarge { spread: u32, padding: u32, size: u32 },
}

/// A generated distance-field atlas held in CPU memory.
#[derive(Debug, Clone)]
pub struct SdfAtlas {
    size: u32,
    spread: u32,
    /// Quantized distance field, one byte per texel, row-major.
    pixels: Vec<u8>,
    glyphs: GlyphTable,
    /// Glyphs that did not fit (capacity exceeded).
    dropped: usize,
}

impl SdfAtlas {
    /// Rasterize, pack and distance-transform the printable ASCII range.
    ///
    /// Running out of atlas space is not an error: the glyphs that did not
    /// fit are absent from the table and counted in [`SdfAtlas::dropped`].
    pub fn generate(
        rasterizer: &mut impl GlyphRasterizer,
        params: &AtlasParams,
    ) -> Result<Self, AtlasError> {
        params.validate()?;

        let size = params.atlas_size;
        let spread = params.spread;
        let raster_px = params.point_size * RASTER_SCALE;

        let mut coverage = vec![0u8; size as usize * size as usize];
        let mut packer = ShelfPacker::new(size, size, params.padding);
        let mut glyphs = HashMap::new();
        let mut dropped = 0;

        for ch in FIRST_CODEPOINT..=LAST_CODEPOINT {
            let Some(bitmap) = rasterizer.rasterize(ch, raster_px) else {
                log::debug!("atlas: no glyph for {ch:?}");
                continue;
            };

            if bitmap.is_empty() {
                glyphs.insert(
                    ch,
                    GlyphRecord {
                        advance: bitmap.advance_width / RASTER_SCALE,
                        ..GlyphRecord::default()
                    },
                );
                continue;
            }
            if bitmap.data.len() < bitmap.width * bitmap.height {
                log::warn!("atlas: truncated bitmap for {ch:?}, skipping");
                continue;
            }

            // The glyph box carries the field margin on every side.
            let box_w = (bitmap.width as u32).saturating_add(2 * spread);
            let box_h = (bitmap.height as u32).saturating_add(2 * spread);
            let Some((x, y)) = packer.pack(box_w, box_h) else {
                dropped += 1;
                continue;
            };

            blit(&mut coverage, size, x + spread, y + spread, &bitmap);
            glyphs.insert(ch, place(&bitmap, x, y, box_w, box_h, size, spread));
        }

        if dropped > 0 {
            log::warn!(
                "atlas: capacity exceeded at {size}px, {dropped} glyphs dropped \
                 (point size {})",
                params.point_size,
            );
        }

        let pixels = distance_field(&coverage, size, size, spread);
        let metrics = rasterizer.line_metrics(raster_px);

        log::info!(
            "atlas: {} glyphs in {size}x{size} (point size {}, spread {spread})",
            glyphs.len(),
            params.point_size,
        );

        Ok(Self {
            size,
            spread,
            pixels,
            glyphs: GlyphTable {
                glyphs,
                ascender: metrics.ascender / RASTER_SCALE,
                descender: metrics.descender / RASTER_SCALE,
                line_height: metrics.line_height / RASTER_SCALE,
            },
            dropped,
        })
    }

    /// Edge length of the square texture in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn spread(&self) -> u32 {
        self.spread
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Split into the texture bytes and the lookup table.
    pub fn into_parts(self) -> (Vec<u8>, GlyphTable) {
        (self.pixels, self.glyphs)
    }
}

impl GlyphSource for SdfAtlas {
    fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

/// Copy a coverage bitmap into the atlas at `(x, y)`.
fn blit(coverage: &mut [u8], atlas_size: u32, x: u32, y: u32, bitmap: &GlyphBitmap) {
    let stride = atlas_size as usize;
    for row in 0..bitmap.height {
        let src = row * bitmap.width;
        let dst = (y as usize + row) * stride + x as usize;
        coverage[dst..dst + bitmap.width].copy_from_slice(&bitmap.data[src..src + bitmap.width]);
    }
}

/// Build the record for a glyph box packed at `(x, y)`, halving raster metrics.
fn place(
    bitmap: &GlyphBitmap,
    x: u32,
    y: u32,
    box_w: u32,
    box_h: u32,
    atlas_size: u32,
    spread: u32,
) -> GlyphRecord {
    let s = atlas_size as f32;
    let margin = spread as f32;
    GlyphRecord {
        u0: x as f32 / s,
        v0: y as f32 / s,
        u1: (x + box_w) as f32 / s,
        v1: (y + box_h) as f32 / s,
        width: box_w as f32 / RASTER_SCALE,
        height: box_h as f32 / RASTER_SCALE,
        bearing_x: (bitmap.left as f32 - margin) / RASTER_SCALE,
        bearing_y: (bitmap.top as f32 + margin) / RASTER_SCALE,
        advance: bitmap.advance_width / RASTER_SCALE,
    }
}

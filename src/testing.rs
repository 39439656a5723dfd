//! Deterministic glyph source shared by unit tests.

use crate::atlas::{AtlasParams, SdfAtlas};
use crate::font::{GlyphBitmap, GlyphRasterizer, LineMetrics};

/// Rasterizes every printable ASCII character except space as the same
/// solid rectangle. Dimensions scale with the pixel size in units of
/// `px / 32`, so at 32 px a glyph is 10x14 with left bearing 2, top 14 and
/// advance 13. Space is empty with advance 8.
pub(crate) struct BoxRasterizer {
    pub(crate) calls: usize,
}

impl BoxRasterizer {
    pub(crate) fn new() -> Self {
        Self { calls: 0 }
    }
}

fn units(px: f32, n: f32) -> f32 {
    (n * px / 32.0).round()
}

impl GlyphRasterizer for BoxRasterizer {
    fn rasterize(&mut self, ch: char, px_size: f32) -> Option<GlyphBitmap> {
        self.calls += 1;
        match ch {
            ' ' => Some(GlyphBitmap {
                advance_width: units(px_size, 8.0),
                ..GlyphBitmap::default()
            }),
            '!'..='~' => {
                let width = units(px_size, 10.0) as usize;
                let height = units(px_size, 14.0) as usize;
                Some(GlyphBitmap {
                    width,
                    height,
                    left: units(px_size, 2.0) as i32,
                    top: height as i32,
                    advance_width: units(px_size, 13.0),
                    data: vec![255; width * height],
                })
            }
            _ => None,
        }
    }

    fn line_metrics(&self, px_size: f32) -> LineMetrics {
        LineMetrics {
            ascender: units(px_size, 24.0),
            descender: units(px_size, 8.0),
            line_height: units(px_size, 36.0),
        }
    }
}

/// Atlas at point size 16 (raster 32 px) in a 256 px texture with spread 4.
///
/// Every glyph fits; records are 9x11 logical units with bearing (-1, 9)
/// and advance 6.5.
pub(crate) fn small_atlas() -> SdfAtlas {
    let params = AtlasParams {
        point_size: 16.0,
        atlas_size: 256,
        spread: 4,
        padding: 2,
    };
    match SdfAtlas::generate(&mut BoxRasterizer::new(), &params) {
        Ok(atlas) => atlas,
        Err(e) => panic!("test atlas generation failed: {e}"),
    }
}

//! Glyph rasterization: the capability the atlas builder consumes.
//!
//! `GlyphRasterizer` is the seam between font parsing and SDF generation.
//! `FontFace` implements it with swash; tests implement it with synthetic
//! bitmaps so atlas output is deterministic.

mod discovery;
mod face;

pub use discovery::find_font_by_name;
pub use face::FontFace;

use std::path::PathBuf;

/// A rasterized coverage bitmap plus its placement metrics, in pixels.
#[derive(Debug, Clone, Default)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// X bearing (positive = right of origin).
    pub left: i32,
    /// Y bearing (positive = above baseline, matching the swash convention).
    pub top: i32,
    pub advance_width: f32,
    /// Grayscale coverage (1 byte per pixel, row-major, `width * height`).
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    /// Whether the bitmap has no pixels (space, or an empty outline).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Vertical font metrics at a given pixel size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the alignment box.
    pub ascender: f32,
    /// Distance from the baseline to the bottom (positive, below baseline).
    pub descender: f32,
    /// Baseline-to-baseline distance.
    pub line_height: f32,
}

/// Produces coverage bitmaps for codepoints.
pub trait GlyphRasterizer {
    /// Rasterize `ch` at `px_size` pixels per em.
    ///
    /// Returns `None` when the font has no glyph for the codepoint.
    fn rasterize(&mut self, ch: char, px_size: f32) -> Option<GlyphBitmap>;

    /// Line metrics at `px_size` pixels per em.
    fn line_metrics(&self, px_size: f32) -> LineMetrics;
}

/// Font resolution and parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font not found: {0}")]
    NotFound(String),
    #[error("failed to read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or corrupt font data: {0}")]
    Parse(String),
}

//! Text layout: line splitting, alignment and glyph quad generation.
//!
//! Layout is a pure function of the text, origin, glyph table and
//! parameters. No shaping: one codepoint maps to one glyph, kerning is not
//! applied.

use crate::atlas::GlyphTable;

/// Horizontal anchoring of each line relative to the origin x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-draw layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub scale: f32,
    pub align: TextAlign,
    /// Straight (non-premultiplied) RGBA written into every vertex.
    pub color: [f32; 4],
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            align: TextAlign::Left,
            color: [1.0; 4],
        }
    }
}

/// One screen-space glyph rectangle with its atlas UVs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub color: [f32; 4],
}

/// Split on `'\n'`, stripping a `'\r'` right before each break.
///
/// `k` breaks always give `k + 1` lines; a trailing break yields a trailing
/// empty line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Width of a single line (no breaks) at `scale`. Unknown codepoints add nothing.
pub fn line_width(line: &str, glyphs: &GlyphTable, scale: f32) -> f32 {
    line.chars()
        .filter_map(|ch| glyphs.get(ch))
        .map(|g| g.advance * scale)
        .sum()
}

/// Width of the widest line of `text` at `scale`.
pub fn measure_text(text: &str, glyphs: &GlyphTable, scale: f32) -> f32 {
    split_lines(text)
        .map(|line| line_width(line, glyphs, scale))
        .fold(0.0, f32::max)
}

/// Lay out `text` with its first baseline at `origin_y`.
///
/// Glyphs without a drawable box (space) advance the pen but produce no quad.
pub fn layout_text(
    text: &str,
    origin_x: f32,
    origin_y: f32,
    glyphs: &GlyphTable,
    params: &LayoutParams,
) -> Vec<GlyphQuad> {
    let s = params.scale;
    let mut quads = Vec::with_capacity(text.len());
    let mut pen_y = origin_y;

    for line in split_lines(text) {
        let mut pen_x = match params.align {
            TextAlign::Left => origin_x,
            TextAlign::Center => origin_x - line_width(line, glyphs, s) * 0.5,
            TextAlign::Right => origin_x - line_width(line, glyphs, s),
        };

        for ch in line.chars() {
            let Some(g) = glyphs.get(ch) else {
                continue;
            };
            if g.is_visible() {
                let x0 = pen_x + g.bearing_x * s;
                let y0 = pen_y - g.bearing_y * s;
                quads.push(GlyphQuad {
                    x0,
                    y0,
                    x1: x0 + g.width * s,
                    y1: y0 + g.height * s,
                    u0: g.u0,
                    v0: g.v0,
                    u1: g.u1,
                    v1: g.v1,
                    color: params.color,
                });
            }
            pen_x += g.advance * s;
        }

        pen_y += glyphs.line_height() * s;
    }

    quads
}

#[cfg(test)]
mod tests;

//! CPU rendering backend.
//!
//! Draws batches into a premultiplied float [`Canvas`] using the same
//! shading functions as the GPU pipelines. Used for headless export when no
//! adapter is available and for pixel-level tests.

use super::{Batch, RenderBackend, RenderError};
use crate::atlas::{GlyphSource, GlyphTable, MAX_ATLAS_SIZE, SdfAtlas};
use crate::style::{Fragment, TextStyle, Uniforms, shade};

/// Premultiplied RGBA float image, row-major, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Canvas {
    /// A canvas filled with `clear` (straight alpha, premultiplied on store).
    pub fn new(width: u32, height: u32, clear: [f32; 4]) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        };
        canvas.clear(clear);
        canvas
    }

    pub fn clear(&mut self, [r, g, b, a]: [f32; 4]) {
        self.pixels.fill([r * a, g * a, b * a, a]);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied pixel at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Source-over blend of a premultiplied color.
    fn blend(&mut self, x: u32, y: u32, src: [f32; 4]) {
        let i = y as usize * self.width as usize + x as usize;
        if let Some(dst) = self.pixels.get_mut(i) {
            let k = 1.0 - src[3];
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s + *d * k;
            }
        }
    }

    /// 8-bit RGBA bytes, the same layout an `Rgba8Unorm` readback produces.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}

/// Atlas kept in memory for CPU sampling.
#[derive(Debug, Clone)]
pub struct SoftwareAtlas {
    size: u32,
    pixels: Vec<u8>,
    glyphs: GlyphTable,
}

impl SoftwareAtlas {
    fn texel(&self, x: i64, y: i64) -> f32 {
        let max = i64::from(self.size) - 1;
        let (x, y) = (x.clamp(0, max) as usize, y.clamp(0, max) as usize);
        self.pixels
            .get(y * self.size as usize + x)
            .map_or(0.0, |&b| f32::from(b) / 255.0)
    }

    /// Bilinear sample at normalized `(u, v)`, clamp-to-edge.
    fn sample(&self, u: f32, v: f32) -> f32 {
        let s = self.size as f32;
        let fx = u * s - 0.5;
        let fy = v * s - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x0 + 1, y0) * tx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - tx) + self.texel(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

impl GlyphSource for SoftwareAtlas {
    fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

/// Rasterizes batches on the CPU into a [`Canvas`].
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    canvas: Option<Canvas>,
    draws: usize,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws submitted in the current frame.
    pub fn draw_count(&self) -> usize {
        self.draws
    }
}

impl RenderBackend for SoftwareBackend {
    type Atlas = SoftwareAtlas;
    type Frame = Canvas;

    fn upload_atlas(&mut self, atlas: SdfAtlas) -> Result<SoftwareAtlas, RenderError> {
        let size = atlas.size();
        if size > MAX_ATLAS_SIZE {
            return Err(RenderError::AtlasTooLarge {
                size,
                max: MAX_ATLAS_SIZE,
            });
        }
        let (pixels, glyphs) = atlas.into_parts();
        Ok(SoftwareAtlas {
            size,
            pixels,
            glyphs,
        })
    }

    fn begin(&mut self, frame: Canvas) {
        self.canvas = Some(frame);
        self.draws = 0;
    }

    fn submit(&mut self, atlas: &SoftwareAtlas, batch: &Batch, uniforms: &Uniforms, style: TextStyle) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        self.draws += 1;
        for quad in batch.vertices().chunks_exact(4) {
            let (tl, br) = (quad[0], quad[2]);
            draw_quad(
                canvas,
                atlas,
                [tl.position, br.position],
                [tl.uv, br.uv],
                tl.color,
                uniforms,
                style,
            );
        }
    }

    fn finish(&mut self) -> Option<Canvas> {
        self.canvas.take()
    }
}

/// Shade every pixel whose center lies inside the axis-aligned quad.
fn draw_quad(
    canvas: &mut Canvas,
    atlas: &SoftwareAtlas,
    [p0, p1]: [[f32; 2]; 2],
    [t0, t1]: [[f32; 2]; 2],
    color: [f32; 4],
    uniforms: &Uniforms,
    style: TextStyle,
) {
    let (qw, qh) = (p1[0] - p0[0], p1[1] - p0[1]);
    if qw <= 0.0 || qh <= 0.0 {
        return;
    }
    // UV change per screen pixel, for the finite-difference derivative.
    let du = (t1[0] - t0[0]) / qw;
    let dv = (t1[1] - t0[1]) / qh;

    let x_start = p0[0].floor().max(0.0) as u32;
    let y_start = p0[1].floor().max(0.0) as u32;
    let x_end = (p1[0].ceil().max(0.0) as u32).min(canvas.width());
    let y_end = (p1[1].ceil().max(0.0) as u32).min(canvas.height());

    for py in y_start..y_end {
        let cy = py as f32 + 0.5;
        if cy < p0[1] || cy >= p1[1] {
            continue;
        }
        let v = t0[1] + (cy - p0[1]) * dv;
        for px in x_start..x_end {
            let cx = px as f32 + 0.5;
            if cx < p0[0] || cx >= p1[0] {
                continue;
            }
            let u = t0[0] + (cx - p0[0]) * du;

            let d = atlas.sample(u, v);
            let fwidth = (atlas.sample(u + du, v) - d).abs() + (atlas.sample(u, v + dv) - d).abs();
            let frag = Fragment {
                sdf: d,
                fwidth,
                uv: [u, v],
                position: [cx, cy],
                color,
            };
            if let Some(src) = shade(style, &frag, uniforms) {
                canvas.blend(px, py, src);
            }
        }
    }
}

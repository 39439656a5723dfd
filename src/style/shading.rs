//! The three shading variants as plain functions.
//!
//! These are the reference formulas: the WGSL fragment entry points in
//! `gpu::pipeline` compute the same thing line for line, and the software
//! backend calls them directly. Output is premultiplied RGBA; `None` means
//! the fragment is discarded.

use super::{TextStyle, Uniforms};

/// Metallic base color of the standard look.
const METAL: [f32; 3] = [0.78, 0.76, 0.72];

/// Inputs of one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Distance-field sample, `0.5` on the glyph edge, larger inside.
    pub sdf: f32,
    /// Screen-space rate of change of `sdf` (`fwidth`).
    pub fwidth: f32,
    pub uv: [f32; 2],
    /// Pixel position, origin top-left.
    pub position: [f32; 2],
    /// Interpolated vertex color (straight alpha).
    pub color: [f32; 4],
}

/// Shade one fragment with the given variant.
pub fn shade(style: TextStyle, frag: &Fragment, u: &Uniforms) -> Option<[f32; 4]> {
    match style {
        TextStyle::Standard => standard(frag, u),
        TextStyle::Neon => neon(frag, u),
        TextStyle::Title => title(frag, u),
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Half-width of the anti-aliasing band.
fn aa_width(frag: &Fragment, u: &Uniforms) -> f32 {
    (frag.fwidth * u.softness).max(1e-4)
}

/// Glow falloff outside the edge: `1` on and inside the edge, reaching `0`
/// at `glow_radius` of the field range outside it.
fn falloff(d: f32, u: &Uniforms) -> f32 {
    let outside = (0.5 - d).max(0.0);
    (1.0 - outside / (0.5 * u.glow_radius).max(1e-3)).clamp(0.0, 1.0)
}

/// Band of width `width` starting at `edge` and going inward.
fn band(d: f32, edge: f32, width: f32, w: f32) -> f32 {
    smoothstep(edge - w, edge + w, d) - smoothstep(edge + width - w, edge + width + w, d)
}

fn premultiply(rgb: [f32; 3], a: f32) -> [f32; 4] {
    [rgb[0] * a, rgb[1] * a, rgb[2] * a, a]
}

fn standard(frag: &Fragment, u: &Uniforms) -> Option<[f32; 4]> {
    let w = aa_width(frag, u);
    let alpha = smoothstep(0.5 - w, 0.5 + w, frag.sdf);

    let [su, sv] = frag.uv;
    let s1 = 0.5 + 0.5 * (u.time * 1.5 + su * 12.0).sin();
    let s2 = 0.5 + 0.5 * (u.time * 0.7 - sv * 8.0 + su * 4.0).sin();
    let shimmer = 0.85 + 0.1 * s1 + 0.05 * s2;

    let lit = u.light_intensity.max(0.0).powf(1.2);
    let c = frag.color;
    let rgb = [
        METAL[0] * shimmer * c[0] * lit,
        METAL[1] * shimmer * c[1] * lit,
        METAL[2] * shimmer * c[2] * lit,
    ];
    let a = alpha * c[3] * lit;
    if a < 0.05 {
        return None;
    }
    Some(premultiply(rgb, a))
}

fn neon(frag: &Fragment, u: &Uniforms) -> Option<[f32; 4]> {
    let w = aa_width(frag, u);
    let d = frag.sdf;
    let half = u.outline_width;
    let stroke = smoothstep(0.5 - half - w, 0.5 - half + w, d)
        - smoothstep(0.5 + half - w, 0.5 + half + w, d);

    let f = falloff(d, u);
    let glow = (0.5 * f.powi(3) + 0.3 * f.powi(4) + 0.2 * f.powi(5)) * u.glow_intensity;

    let flicker = 0.95 + 0.05 * (30.0 * u.time + 10.0 * frag.uv[0]).sin();
    let c = frag.color;
    let g = u.glow_color;
    let glow_part = glow * g[3] * (1.0 - stroke);

    let scale = flicker * c[3] * u.light_intensity;
    let rgb = [
        (c[0] * stroke + g[0] * glow_part) * scale,
        (c[1] * stroke + g[1] * glow_part) * scale,
        (c[2] * stroke + g[2] * glow_part) * scale,
    ];
    let a = ((stroke + glow_part).min(1.0) * scale).clamp(0.0, 1.0);
    if a < 1e-3 {
        return None;
    }
    Some([rgb[0], rgb[1], rgb[2], a])
}

fn title(frag: &Fragment, u: &Uniforms) -> Option<[f32; 4]> {
    let w = aa_width(frag, u) * 0.5;
    let d = frag.sdf;
    let fill = smoothstep(0.5 - w, 0.5 + w, d);

    let shadow = smoothstep(0.5, 0.55, d) - smoothstep(0.55, 0.7, d);
    let shade = 1.0 - 0.4 * shadow;
    let outline = band(d, 0.52, u.outline_width, w) * u.outline_color[3];

    let gradient = 1.0 - 0.25 * (frag.position[1] / u.resolution[1].max(1.0)).clamp(0.0, 1.0);
    let c = frag.color;
    let o = u.outline_color;
    let rgb: [f32; 3] = std::array::from_fn(|i| {
        let base = c[i] * gradient * shade;
        base + (o[i] - base) * outline
    });

    let atmosphere = falloff(d, u).powi(4) * 0.15 * u.glow_intensity * (1.0 - fill);
    let fill_a = fill * c[3];
    let g = u.glow_color;
    let lit = u.light_intensity;
    let out = [
        (rgb[0] * fill_a + g[0] * atmosphere) * lit,
        (rgb[1] * fill_a + g[1] * atmosphere) * lit,
        (rgb[2] * fill_a + g[2] * atmosphere) * lit,
        ((fill_a + atmosphere).min(1.0) * lit).clamp(0.0, 1.0),
    ];
    if out[3] < 1e-3 {
        return None;
    }
    Some(out)
}

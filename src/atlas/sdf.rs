//! Brute-force signed distance transform over a coverage bitmap.
//!
//! For every texel, the nearest texel of the opposite inside/outside class
//! is searched in a square window of radius `spread`. A summed-area table of
//! the inside mask short-circuits windows that contain a single class, which
//! is most of an atlas, without changing the result.

/// Coverage above this value counts as inside (strictly more than 50%).
const INSIDE_THRESHOLD: u8 = 127;

/// Compute the quantized signed distance field of a `width` x `height`
/// coverage bitmap.
///
/// Distances are positive inside, negative outside, clamped to `±spread`,
/// mapped to `[0, 1]` by `d / spread * 0.5 + 0.5` and stored as `u8`.
pub fn distance_field(coverage: &[u8], width: u32, height: u32, spread: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let s = spread as usize;
    debug_assert_eq!(coverage.len(), w * h);

    let inside: Vec<bool> = coverage.iter().map(|&c| c > INSIDE_THRESHOLD).collect();
    let sat = SummedArea::new(&inside, w, h);
    let max_dist = spread as f32;

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let y0 = y.saturating_sub(s);
        let y1 = (y + s).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(s);
            let x1 = (x + s).min(w - 1);
            let is_inside = inside[y * w + x];

            let count = sat.count(x0, y0, x1, y1);
            let area = (x1 - x0 + 1) * (y1 - y0 + 1);
            let uniform = if is_inside { count == area } else { count == 0 };

            let dist = if uniform {
                max_dist
            } else {
                nearest_opposite(&inside, w, (x, y), (x0, y0, x1, y1), is_inside)
                    .min(max_dist)
            };
            let signed = if is_inside { dist } else { -dist };
            out[y * w + x] = encode(signed, max_dist);
        }
    }
    out
}

/// Map a signed distance in `[-spread, spread]` to a `u8`.
fn encode(signed: f32, spread: f32) -> u8 {
    let v = (signed / spread) * 0.5 + 0.5;
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Euclidean distance from `(x, y)` to the nearest texel in the window whose
/// class differs from `is_inside`. `f32::INFINITY` when there is none.
fn nearest_opposite(
    inside: &[bool],
    w: usize,
    (x, y): (usize, usize),
    (x0, y0, x1, y1): (usize, usize, usize, usize),
    is_inside: bool,
) -> f32 {
    let mut best = usize::MAX;
    for ny in y0..=y1 {
        let dy = ny.abs_diff(y);
        let row = ny * w;
        for nx in x0..=x1 {
            if inside[row + nx] != is_inside {
                let dx = nx.abs_diff(x);
                best = best.min(dx * dx + dy * dy);
            }
        }
    }
    if best == usize::MAX {
        f32::INFINITY
    } else {
        (best as f32).sqrt()
    }
}

/// Summed-area table of the inside mask with a zero border row/column.
struct SummedArea {
    stride: usize,
    sums: Vec<u32>,
}

impl SummedArea {
    fn new(inside: &[bool], w: usize, h: usize) -> Self {
        let stride = w + 1;
        let mut sums = vec![0u32; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u32;
            for x in 0..w {
                row_sum += u32::from(inside[y * w + x]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { stride, sums }
    }

    /// Inside texels in the inclusive rectangle `(x0, y0)..=(x1, y1)`.
    fn count(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> usize {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        (at(x1 + 1, y1 + 1) + at(x0, y0) - at(x0, y1 + 1) - at(x1 + 1, y0)) as usize
    }
}

//! Style state and the shared per-frame uniform model.
//!
//! [`StyleState`] is the caller-owned parameter set. Setters clamp, so the
//! values read by the shading variants are always in range. [`Uniforms`] is
//! the block built from it for each flush; every variant reads the same one.

mod light;
mod shading;
mod uniforms;

pub use light::{LightTimeline, ease_light};
pub use shading::{Fragment, shade};
pub use uniforms::{UNIFORM_SIZE, Uniforms, ortho_projection};

use crate::layout::{LayoutParams, TextAlign};

/// The three shading looks. Selection is an index into a pipeline table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Metallic fill with a slow shimmer.
    #[default]
    Standard,
    /// Thin bright stroke with a layered glow and flicker.
    Neon,
    /// Sharp engraved fill with inner shadow, outline and atmosphere.
    Title,
}

impl TextStyle {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Neon, Self::Title];

    /// Position in [`TextStyle::ALL`], used to index per-style pipelines.
    pub fn index(self) -> usize {
        match self {
            Self::Standard => 0,
            Self::Neon => 1,
            Self::Title => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Neon => "neon",
            Self::Title => "title",
        }
    }
}

/// Caller-facing style parameters. Read once per flush.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    style: TextStyle,
    color: [f32; 4],
    glow_color: [f32; 4],
    outline_color: [f32; 4],
    glow_intensity: f32,
    glow_radius: f32,
    outline_width: f32,
    softness: f32,
    scale: f32,
    align: TextAlign,
    light_intensity: f32,
    time: f32,
    resolution: [f32; 2],
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            style: TextStyle::Standard,
            color: [1.0, 1.0, 1.0, 1.0],
            glow_color: [1.0, 0.78, 0.45, 1.0],
            outline_color: [0.12, 0.08, 0.04, 1.0],
            glow_intensity: 1.0,
            glow_radius: 0.5,
            outline_width: 0.1,
            softness: 1.0,
            scale: 1.0,
            align: TextAlign::Left,
            light_intensity: 1.0,
            time: 0.0,
            resolution: [1.0, 1.0],
        }
    }
}

fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn non_negative(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}

fn unit_color([r, g, b, a]: [f32; 4]) -> [f32; 4] {
    [unit(r), unit(g), unit(b), unit(a)]
}

/// Smallest accepted text scale.
pub const MIN_SCALE: f32 = 0.01;
/// Largest accepted outline width (half the distance-field range).
pub const MAX_OUTLINE_WIDTH: f32 = 0.5;

impl StyleState {
    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = unit_color(color);
    }

    pub fn set_glow_color(&mut self, color: [f32; 4]) {
        self.glow_color = unit_color(color);
    }

    pub fn set_outline_color(&mut self, color: [f32; 4]) {
        self.outline_color = unit_color(color);
    }

    pub fn set_glow_intensity(&mut self, intensity: f32) {
        self.glow_intensity = non_negative(intensity);
    }

    /// Glow reach as a fraction of the distance-field range, `0..=1`.
    pub fn set_glow_radius(&mut self, radius: f32) {
        self.glow_radius = unit(radius);
    }

    pub fn set_outline_width(&mut self, width: f32) {
        self.outline_width = non_negative(width).min(MAX_OUTLINE_WIDTH);
    }

    /// Multiplier on the anti-aliasing band. `0` gives the sharpest edge.
    pub fn set_softness(&mut self, softness: f32) {
        self.softness = non_negative(softness);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_nan() { 1.0 } else { scale.max(MIN_SCALE) };
    }

    pub fn set_alignment(&mut self, align: TextAlign) {
        self.align = align;
    }

    /// Overall light level, `0` dark to `1` fully lit.
    pub fn set_light_intensity(&mut self, intensity: f32) {
        self.light_intensity = unit(intensity);
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub(crate) fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width.max(1.0), height.max(1.0)];
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn glow_color(&self) -> [f32; 4] {
        self.glow_color
    }

    pub fn outline_color(&self) -> [f32; 4] {
        self.outline_color
    }

    pub fn glow_intensity(&self) -> f32 {
        self.glow_intensity
    }

    pub fn glow_radius(&self) -> f32 {
        self.glow_radius
    }

    pub fn outline_width(&self) -> f32 {
        self.outline_width
    }

    pub fn softness(&self) -> f32 {
        self.softness
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn alignment(&self) -> TextAlign {
        self.align
    }

    pub fn light_intensity(&self) -> f32 {
        self.light_intensity
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.resolution
    }

    /// Layout parameters for the current scale, alignment and color.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            scale: self.scale,
            align: self.align,
            color: self.color,
        }
    }

    /// Uniform block for the current state and the given projection.
    pub fn uniforms(&self, projection: [f32; 16]) -> Uniforms {
        Uniforms {
            projection,
            glow_color: self.glow_color,
            outline_color: self.outline_color,
            time: self.time,
            glow_intensity: self.glow_intensity,
            glow_radius: self.glow_radius,
            outline_width: self.outline_width,
            resolution: self.resolution,
            softness: self.softness,
            light_intensity: self.light_intensity,
        }
    }
}

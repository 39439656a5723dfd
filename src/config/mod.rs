//! Configuration structures and loading logic.

mod io;

pub use io::{config_dir, config_path};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::atlas::AtlasParams;
use crate::export::ExportConfig;
use crate::font::{FontError, FontFace};
use crate::layout::TextAlign;
use crate::render::DEFAULT_ALIAS;
use crate::style::{LightTimeline, StyleState, TextStyle};

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub font: FontConfig,
    pub style: StyleConfig,
    pub light: LightTimeline,
    pub scene: SceneConfig,
    pub export: ExportConfig,
}

/// Font configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family name resolved through system font discovery.
    pub family: String,
    /// Explicit font file; takes precedence over `family`.
    pub path: Option<PathBuf>,
    /// Logical point size the atlas is built at.
    pub size: f32,
    pub atlas_size: u32,
    /// Distance-field spread in atlas pixels.
    pub spread: u32,
    pub alias: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        let atlas = AtlasParams::default();
        Self {
            family: "DejaVu Sans".to_owned(),
            path: None,
            size: atlas.point_size,
            atlas_size: atlas.atlas_size,
            spread: atlas.spread,
            alias: DEFAULT_ALIAS.to_owned(),
        }
    }
}

impl FontConfig {
    pub fn atlas_params(&self) -> AtlasParams {
        AtlasParams {
            point_size: self.size,
            atlas_size: self.atlas_size,
            spread: self.spread,
            ..AtlasParams::default()
        }
    }

    /// Open the configured file, or resolve the family by name.
    pub fn open_face(&self) -> Result<FontFace, FontError> {
        match &self.path {
            Some(path) => FontFace::from_file(path),
            None => FontFace::by_name(&self.family),
        }
    }
}

/// Initial style state. Values are clamped when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub variant: TextStyle,
    pub align: TextAlign,
    pub scale: f32,
    pub text_color: [f32; 4],
    pub glow_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub glow_intensity: f32,
    pub glow_radius: f32,
    pub outline_width: f32,
    pub softness: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let s = StyleState::default();
        Self {
            variant: s.style(),
            align: TextAlign::Center,
            scale: s.scale(),
            text_color: s.color(),
            glow_color: s.glow_color(),
            outline_color: s.outline_color(),
            glow_intensity: s.glow_intensity(),
            glow_radius: s.glow_radius(),
            outline_width: s.outline_width(),
            softness: s.softness(),
        }
    }
}

impl StyleConfig {
    /// Push every configured value through the clamping setters.
    pub fn apply(&self, state: &mut StyleState) {
        state.set_style(self.variant);
        state.set_alignment(self.align);
        state.set_scale(self.scale);
        state.set_color(self.text_color);
        state.set_glow_color(self.glow_color);
        state.set_outline_color(self.outline_color);
        state.set_glow_intensity(self.glow_intensity);
        state.set_glow_radius(self.glow_radius);
        state.set_outline_width(self.outline_width);
        state.set_softness(self.softness);
    }
}

/// What the command-line front end draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub text: String,
    /// Horizontal anchor as a fraction of the viewport width.
    pub x: f32,
    /// First baseline as a fraction of the viewport height.
    pub y: f32,
    /// Straight-alpha background color.
    pub background: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            text: "LUMEN".to_owned(),
            x: 0.5,
            y: 0.55,
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl SceneConfig {
    /// Anchor in pixels for a `width` x `height` viewport.
    pub fn anchor(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

//! Batch renderer: font registry, per-frame state and backend dispatch.
//!
//! [`TextRenderer`] owns everything backend-independent: the loaded atlases,
//! the style state, the batch and the projection. A [`RenderBackend`] turns
//! one filled batch plus a uniform block into one draw.

mod batch;
mod registry;
pub mod software;

pub use batch::{Batch, MAX_GLYPHS, VERTEX_STRIDE, Vertex};
pub use registry::{DEFAULT_ALIAS, FontRegistry};

use std::path::Path;

use crate::atlas::{AtlasError, AtlasParams, GlyphSource, SdfAtlas};
use crate::font::{FontError, FontFace, GlyphRasterizer};
use crate::layout;
use crate::style::{StyleState, TextStyle, Uniforms, ortho_projection};

/// Resource failures while setting up rendering or loading fonts.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error("atlas of {size}px exceeds the device limit of {max}px")]
    AtlasTooLarge { size: u32, max: u32 },
}

/// Where batches are drawn.
///
/// `begin`/`finish` bracket a frame; every `submit` in between is one
/// indexed draw with the atlas, uniforms and shading variant given.
pub trait RenderBackend {
    /// Backend-resident atlas (texture plus glyph table).
    type Atlas: GlyphSource;
    /// Whatever the backend draws into for one frame.
    type Frame;

    fn upload_atlas(&mut self, atlas: SdfAtlas) -> Result<Self::Atlas, RenderError>;

    fn begin(&mut self, frame: Self::Frame);

    fn submit(&mut self, atlas: &Self::Atlas, batch: &Batch, uniforms: &Uniforms, style: TextStyle);

    /// End the frame, handing the frame target back.
    fn finish(&mut self) -> Option<Self::Frame>;
}

/// Text renderer over a backend.
pub struct TextRenderer<B: RenderBackend> {
    backend: B,
    fonts: FontRegistry<B::Atlas>,
    style: StyleState,
    batch: Batch,
    projection: [f32; 16],
    in_frame: bool,
}

impl<B: RenderBackend> TextRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fonts: FontRegistry::new(),
            style: StyleState::default(),
            batch: Batch::new(),
            projection: ortho_projection(1.0, 1.0),
            in_frame: false,
        }
    }

    /// Resolve a system font by family name and build its atlas at the
    /// default atlas size.
    pub fn load_font(&mut self, name: &str, size: f32, alias: &str) -> Result<(), RenderError> {
        let mut face = FontFace::by_name(name)?;
        let params = AtlasParams {
            point_size: size,
            ..AtlasParams::default()
        };
        self.load_with(&mut face, &params, alias)
    }

    /// Load a font file and build its atlas with an `atlas_size` texture.
    pub fn load_font_from_file(
        &mut self,
        path: &Path,
        size: f32,
        alias: &str,
        atlas_size: u32,
    ) -> Result<(), RenderError> {
        let mut face = FontFace::from_file(path)?;
        let params = AtlasParams {
            point_size: size,
            atlas_size,
            ..AtlasParams::default()
        };
        self.load_with(&mut face, &params, alias)
    }

    /// Generate an atlas from any rasterizer and register it.
    pub fn load_with(
        &mut self,
        rasterizer: &mut impl GlyphRasterizer,
        params: &AtlasParams,
        alias: &str,
    ) -> Result<(), RenderError> {
        let atlas = SdfAtlas::generate(rasterizer, params)?;
        self.add_atlas(alias, atlas)
    }

    /// Upload a prebuilt atlas and register it, replacing any atlas under
    /// the same alias.
    pub fn add_atlas(&mut self, alias: &str, atlas: SdfAtlas) -> Result<(), RenderError> {
        let uploaded = self.backend.upload_atlas(atlas)?;
        if self.fonts.insert(alias, uploaded).is_some() {
            log::info!("fonts: replaced atlas '{alias}'");
        } else {
            log::info!("fonts: loaded atlas '{alias}'");
        }
        Ok(())
    }

    /// Start a frame: projection for `viewport`, time, empty batch.
    pub fn begin_frame(&mut self, frame: B::Frame, time: f32, viewport: (u32, u32)) {
        if self.in_frame {
            log::warn!("render: begin_frame while a frame is open, discarding it");
            let _ = self.backend.finish();
        }
        let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        self.projection = ortho_projection(w, h);
        self.style.set_time(time);
        self.style.set_resolution(w, h);
        self.batch.clear();
        self.backend.begin(frame);
        self.in_frame = true;
    }

    /// Lay out `text` with its first baseline at `(x, y)` and draw it.
    ///
    /// One draw per call. Unknown aliases fall back to `"default"`; with no
    /// atlas at all nothing is drawn.
    pub fn draw(&mut self, text: &str, x: f32, y: f32, alias: &str) {
        if !self.in_frame {
            log::warn!("render: draw outside begin_frame/end_frame ignored");
            return;
        }
        let Some(atlas) = self.fonts.resolve(alias) else {
            return;
        };

        let quads = layout::layout_text(text, x, y, atlas.glyphs(), &self.style.layout_params());
        self.batch.extend(&quads);
        if self.batch.is_empty() {
            return;
        }

        let uniforms = self.style.uniforms(self.projection);
        self.backend
            .submit(atlas, &self.batch, &uniforms, self.style.style());
        self.batch.clear();
    }

    /// Close the frame and take the frame target back.
    pub fn end_frame(&mut self) -> Option<B::Frame> {
        if !self.in_frame {
            return None;
        }
        self.in_frame = false;
        self.backend.finish()
    }

    /// Width of the widest line of `text` at the current scale.
    pub fn measure_text(&self, text: &str, alias: &str) -> f32 {
        self.fonts
            .resolve(alias)
            .map_or(0.0, |atlas| layout::measure_text(text, atlas.glyphs(), self.style.scale()))
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleState {
        &mut self.style
    }

    pub fn fonts(&self) -> &FontRegistry<B::Atlas> {
        &self.fonts
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Quads dropped because a single draw exceeded [`MAX_GLYPHS`].
    pub fn dropped_glyphs(&self) -> usize {
        self.batch.dropped()
    }
}

#[cfg(test)]
mod tests;

use super::*;
use crate::atlas::GlyphTable;
use crate::layout::{GlyphQuad, TextAlign};
use crate::testing::{BoxRasterizer, small_atlas};

/// What a submit looked like.
#[derive(Debug, Clone)]
struct Draw {
    vertices: usize,
    indices: Vec<u16>,
    style: TextStyle,
    time: f32,
    light: f32,
    resolution: [f32; 2],
    first_x: Option<f32>,
}

struct MockAtlas {
    id: usize,
    glyphs: GlyphTable,
}

impl GlyphSource for MockAtlas {
    fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

#[derive(Default)]
struct RecordingBackend {
    uploads: usize,
    frames: usize,
    draws: Vec<(usize, Draw)>,
    open: Option<u32>,
}

impl RenderBackend for RecordingBackend {
    type Atlas = MockAtlas;
    type Frame = u32;

    fn upload_atlas(&mut self, atlas: SdfAtlas) -> Result<MockAtlas, RenderError> {
        self.uploads += 1;
        let (_, glyphs) = atlas.into_parts();
        Ok(MockAtlas {
            id: self.uploads,
            glyphs,
        })
    }

    fn begin(&mut self, frame: u32) {
        self.frames += 1;
        self.open = Some(frame);
    }

    fn submit(&mut self, atlas: &MockAtlas, batch: &Batch, uniforms: &Uniforms, style: TextStyle) {
        self.draws.push((
            atlas.id,
            Draw {
                vertices: batch.vertices().len(),
                indices: batch.indices().to_vec(),
                style,
                time: uniforms.time,
                light: uniforms.light_intensity,
                resolution: uniforms.resolution,
                first_x: batch.vertices().first().map(|v| v.position[0]),
            },
        ));
    }

    fn finish(&mut self) -> Option<u32> {
        self.open.take()
    }
}

fn renderer() -> TextRenderer<RecordingBackend> {
    let mut r = TextRenderer::new(RecordingBackend::default());
    r.add_atlas("default", small_atlas()).expect("upload");
    r
}

#[test]
fn two_glyphs_make_eight_vertices_twelve_indices() {
    let mut r = renderer();
    r.begin_frame(7, 0.0, (800, 600));
    r.draw("AA", 10.0, 50.0, "default");
    assert_eq!(r.end_frame(), Some(7));

    let draws = &r.backend().draws;
    assert_eq!(draws.len(), 1);
    let d = &draws[0].1;
    assert_eq!(d.vertices, 8);
    assert_eq!(d.indices, [0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
}

#[test]
fn one_submit_per_draw_in_call_order() {
    let mut r = renderer();
    r.begin_frame(0, 0.0, (800, 600));
    r.draw("first", 0.0, 20.0, "default");
    r.style_mut().set_style(TextStyle::Neon);
    r.draw("second", 300.0, 40.0, "default");
    r.end_frame();

    let draws = &r.backend().draws;
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].1.style, TextStyle::Standard);
    assert_eq!(draws[1].1.style, TextStyle::Neon);
    // Batch is cleared after each flush: indices restart at zero.
    assert_eq!(draws[1].1.indices[0], 0);
    assert!(draws[1].1.first_x.expect("vertex") > 290.0);
}

#[test]
fn empty_or_blank_text_submits_nothing() {
    let mut r = renderer();
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("", 0.0, 0.0, "default");
    r.draw("   \n ", 0.0, 0.0, "default");
    r.draw("\u{1F600}", 0.0, 0.0, "default");
    r.end_frame();
    assert!(r.backend().draws.is_empty());
}

#[test]
fn draw_outside_frame_is_ignored() {
    let mut r = renderer();
    r.draw("AA", 0.0, 0.0, "default");
    assert!(r.backend().draws.is_empty());
    assert_eq!(r.end_frame(), None);
}

#[test]
fn frame_state_reaches_uniforms() {
    let mut r = renderer();
    r.style_mut().set_light_intensity(0.25);
    r.begin_frame(0, 3.5, (1280, 720));
    r.draw("x", 0.0, 20.0, "default");
    r.end_frame();

    let d = &r.backend().draws[0].1;
    assert_eq!(d.time, 3.5);
    assert_eq!(d.light, 0.25);
    assert_eq!(d.resolution, [1280.0, 720.0]);
}

#[test]
fn uniform_values_carry_across_frames() {
    let mut r = renderer();
    r.style_mut().set_light_intensity(0.4);
    r.begin_frame(0, 0.0, (100, 100));
    r.end_frame();
    r.begin_frame(1, 1.0, (100, 100));
    r.draw("a", 0.0, 20.0, "default");
    r.end_frame();
    assert_eq!(r.backend().frames, 2);
    assert_eq!(r.backend().draws[0].1.light, 0.4);
}

#[test]
fn unknown_alias_falls_back_to_default() {
    let mut r = renderer();
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("a", 0.0, 20.0, "missing");
    r.end_frame();
    assert_eq!(r.backend().draws.len(), 1);
    assert_eq!(r.backend().draws[0].0, 1);
}

#[test]
fn no_default_means_no_geometry() {
    let mut r = TextRenderer::new(RecordingBackend::default());
    r.add_atlas("title", small_atlas()).expect("upload");
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("a", 0.0, 20.0, "body");
    r.end_frame();
    assert!(r.backend().draws.is_empty());
    assert_eq!(r.measure_text("abc", "body"), 0.0);
}

#[test]
fn aliases_select_their_atlas() {
    let mut r = renderer();
    r.add_atlas("title", small_atlas()).expect("upload");
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("a", 0.0, 20.0, "title");
    r.draw("a", 0.0, 20.0, "");
    r.end_frame();
    let ids: Vec<usize> = r.backend().draws.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, [2, 1]);
}

#[test]
fn reloading_alias_replaces_atlas() {
    let mut r = renderer();
    r.add_atlas("default", small_atlas()).expect("upload");
    assert_eq!(r.fonts().len(), 1);
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("a", 0.0, 20.0, "default");
    r.end_frame();
    assert_eq!(r.backend().draws[0].0, 2);
}

#[test]
fn load_with_rasterizer_registers_alias() {
    let mut r = TextRenderer::new(RecordingBackend::default());
    let params = AtlasParams {
        point_size: 8.0,
        atlas_size: 128,
        ..AtlasParams::default()
    };
    r.load_with(&mut BoxRasterizer::new(), &params, "small")
        .expect("load");
    assert!(r.fonts().contains("small"));

    let bad = AtlasParams {
        atlas_size: 10,
        ..params
    };
    let err = r.load_with(&mut BoxRasterizer::new(), &bad, "bad").unwrap_err();
    assert!(matches!(err, RenderError::Atlas(AtlasError::InvalidSize(10))));
    assert!(!r.fonts().contains("bad"));
}

#[test]
fn missing_font_file_is_not_found() {
    let mut r = TextRenderer::new(RecordingBackend::default());
    let err = r
        .load_font_from_file(Path::new("/nonexistent/lumen/font.ttf"), 32.0, "x", 512)
        .unwrap_err();
    assert!(matches!(err, RenderError::Font(FontError::NotFound(_))));
    assert_eq!(r.backend().uploads, 0);
}

#[test]
fn measure_uses_current_scale() {
    let mut r = renderer();
    assert!((r.measure_text("ab\nabcd", "default") - 26.0).abs() < 1e-4);
    r.style_mut().set_scale(2.0);
    assert!((r.measure_text("ab\nabcd", "default") - 52.0).abs() < 1e-4);
}

#[test]
fn alignment_applies_to_draw() {
    let mut r = renderer();
    r.style_mut().set_alignment(TextAlign::Right);
    r.begin_frame(0, 0.0, (100, 100));
    r.draw("a", 50.0, 20.0, "default");
    r.end_frame();
    // Right aligned: pen starts one advance (6.5) left of the origin.
    let x = r.backend().draws[0].1.first_x.expect("vertex");
    assert!((x - (50.0 - 6.5 - 1.0)).abs() < 1e-4);
}

#[test]
fn oversized_draw_is_truncated_to_batch_capacity() {
    let mut r = renderer();
    let text = "x".repeat(MAX_GLYPHS + 10);
    r.begin_frame(0, 0.0, (100, 100));
    r.draw(&text, 0.0, 20.0, "default");
    r.end_frame();
    assert_eq!(r.backend().draws[0].1.vertices, MAX_GLYPHS * 4);
    assert_eq!(r.dropped_glyphs(), 10);
}

#[test]
fn batch_bytes_match_counts() {
    let mut batch = Batch::new();
    let quad = GlyphQuad {
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
        color: [1.0; 4],
    };
    assert!(batch.push_quad(&quad));
    assert_eq!(batch.vertex_bytes().len(), 4 * VERTEX_STRIDE as usize);
    assert_eq!(batch.index_bytes().len(), 12);
    let first = f32::from_ne_bytes(batch.vertex_bytes()[8..12].try_into().expect("4 bytes"));
    assert_eq!(first, 0.0);
    let br_u = f32::from_ne_bytes(batch.vertex_bytes()[2 * 32 + 8..2 * 32 + 12].try_into().expect("4 bytes"));
    assert_eq!(br_u, 1.0);
    batch.clear();
    assert!(batch.is_empty());
}

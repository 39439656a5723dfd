use super::*;
use crate::atlas::GlyphSource;
use crate::testing::small_atlas;

// Box atlas records: 9x11, bearing (-1, 9), advance 6.5, line height 18.

#[test]
fn line_count_is_breaks_plus_one() {
    assert_eq!(split_lines("").count(), 1);
    assert_eq!(split_lines("abc").count(), 1);
    assert_eq!(split_lines("a\nb").count(), 2);
    assert_eq!(split_lines("a\n").count(), 2);
    assert_eq!(split_lines("\n\n\n").count(), 4);
}

#[test]
fn carriage_return_stripped() {
    let lines: Vec<_> = split_lines("one\r\ntwo\r\n").collect();
    assert_eq!(lines, ["one", "two", ""]);
}

#[test]
fn left_aligned_quad_geometry() {
    let atlas = small_atlas();
    let quads = layout_text("AB", 100.0, 50.0, atlas.glyphs(), &LayoutParams::default());
    assert_eq!(quads.len(), 2);

    let a = quads[0];
    assert!((a.x0 - 99.0).abs() < 1e-4);
    assert!((a.y0 - 41.0).abs() < 1e-4);
    assert!((a.x1 - 108.0).abs() < 1e-4);
    assert!((a.y1 - 52.0).abs() < 1e-4);

    let b = quads[1];
    assert!((b.x0 - 105.5).abs() < 1e-4);

    let rec = atlas.glyphs().get('A').expect("'A'");
    assert_eq!((a.u0, a.v0, a.u1, a.v1), (rec.u0, rec.v0, rec.u1, rec.v1));
}

#[test]
fn scale_multiplies_everything() {
    let atlas = small_atlas();
    let params = LayoutParams {
        scale: 2.0,
        ..LayoutParams::default()
    };
    let quads = layout_text("AB", 0.0, 0.0, atlas.glyphs(), &params);
    assert!((quads[0].x0 - -2.0).abs() < 1e-4);
    assert!((quads[0].y0 - -18.0).abs() < 1e-4);
    assert!((quads[0].x1 - quads[0].x0 - 18.0).abs() < 1e-4);
    assert!((quads[1].x0 - 11.0).abs() < 1e-4);
}

#[test]
fn center_alignment_offsets_by_half_width() {
    let atlas = small_atlas();
    let table = atlas.glyphs();
    let width = line_width("Hello", table, 1.5);
    let centered = LayoutParams {
        scale: 1.5,
        align: TextAlign::Center,
        ..LayoutParams::default()
    };
    let left = LayoutParams {
        scale: 1.5,
        ..LayoutParams::default()
    };
    let c = layout_text("Hello", 200.0, 80.0, table, &centered);
    let l = layout_text("Hello", 200.0 - width / 2.0, 80.0, table, &left);
    assert_eq!(c, l);
}

#[test]
fn right_alignment_ends_at_origin() {
    let atlas = small_atlas();
    let params = LayoutParams {
        align: TextAlign::Right,
        ..LayoutParams::default()
    };
    let quads = layout_text("ab", 100.0, 0.0, atlas.glyphs(), &params);
    // Pen ends at the origin: last glyph starts one advance before it.
    assert!((quads[1].x0 - (100.0 - 6.5 - 1.0)).abs() < 1e-4);
}

#[test]
fn lines_advance_by_line_height() {
    let atlas = small_atlas();
    let quads = layout_text("a\nb\n\nc", 0.0, 20.0, atlas.glyphs(), &LayoutParams::default());
    let tops: Vec<f32> = quads.iter().map(|q| q.y0).collect();
    assert_eq!(tops, [11.0, 29.0, 65.0]);
    // Each line restarts at the origin.
    assert!(quads.iter().all(|q| (q.x0 - -1.0).abs() < 1e-4));
}

#[test]
fn space_advances_without_quad() {
    let atlas = small_atlas();
    let quads = layout_text("a b", 0.0, 0.0, atlas.glyphs(), &LayoutParams::default());
    assert_eq!(quads.len(), 2);
    assert!((quads[1].x0 - (6.5 + 4.0 - 1.0)).abs() < 1e-4);
}

#[test]
fn unknown_codepoints_skipped_without_advance() {
    let atlas = small_atlas();
    let table = atlas.glyphs();
    let with = layout_text("aéb", 0.0, 0.0, table, &LayoutParams::default());
    let without = layout_text("ab", 0.0, 0.0, table, &LayoutParams::default());
    assert_eq!(with, without);
    assert_eq!(line_width("é\u{7f}", table, 1.0), 0.0);
}

#[test]
fn measure_returns_widest_line() {
    let atlas = small_atlas();
    let table = atlas.glyphs();
    assert!((measure_text("ab\nabcd\nabc", table, 1.0) - 26.0).abs() < 1e-4);
    assert_eq!(measure_text("", table, 1.0), 0.0);
}

#[test]
fn color_copied_to_every_quad() {
    let atlas = small_atlas();
    let params = LayoutParams {
        color: [0.2, 0.4, 0.6, 0.8],
        ..LayoutParams::default()
    };
    let quads = layout_text("xyz", 0.0, 0.0, atlas.glyphs(), &params);
    assert!(quads.iter().all(|q| q.color == [0.2, 0.4, 0.6, 0.8]));
}

use std::cell::Cell;

use super::*;
use crate::render::TextRenderer;
use crate::render::software::SoftwareBackend;
use crate::testing::small_atlas;

/// Scratch directory under the system temp dir, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("lumen_text_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Self(dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Target whose "pixels" encode the frame time, and which records the
/// times it was asked for.
struct MockTarget {
    times: Vec<f32>,
    fail_at: Option<usize>,
}

impl MockTarget {
    fn new() -> Self {
        Self {
            times: Vec::new(),
            fail_at: None,
        }
    }
}

impl OffscreenTarget for MockTarget {
    type Renderer = Vec<f32>;

    fn width(&self) -> u32 {
        2
    }

    fn height(&self) -> u32 {
        1
    }

    fn capture(
        &mut self,
        time: f32,
        render: &mut dyn FnMut(&mut Vec<f32>, f32),
    ) -> Result<Vec<u8>, ExportError> {
        if self.fail_at == Some(self.times.len()) {
            return Err(ExportError::Readback("device lost".to_owned()));
        }
        self.times.push(time);
        let mut log = Vec::new();
        render(&mut log, time);
        let mut pixels = time.to_ne_bytes().to_vec();
        pixels.extend_from_slice(&[0; 4]);
        Ok(pixels)
    }
}

/// Writer that keeps frames in memory.
#[derive(Default)]
struct MemoryWriter {
    frames: Vec<(PathBuf, Vec<u8>)>,
    fail_at: Option<usize>,
}

impl FrameWriter for MemoryWriter {
    fn write_frame(
        &mut self,
        pixels: &[u8],
        _width: u32,
        _height: u32,
        path: &Path,
    ) -> Result<(), ExportError> {
        if self.fail_at == Some(self.frames.len()) {
            return Err(ExportError::Encode {
                path: path.to_path_buf(),
                message: "disk full".to_owned(),
            });
        }
        self.frames.push((path.to_path_buf(), pixels.to_vec()));
        Ok(())
    }

    fn extension(&self) -> &str {
        "raw"
    }
}

fn config(dir: &Path) -> ExportConfig {
    ExportConfig {
        width: 2,
        height: 1,
        fps: 10,
        duration: 1.0,
        output_dir: dir.to_path_buf(),
        filename_prefix: "frame_".to_owned(),
    }
}

#[test]
fn one_second_at_ten_fps_is_ten_frames() {
    let dir = ScratchDir::new("ten_frames");
    let seq = FrameSequencer::new();
    let mut target = MockTarget::new();
    let mut writer = MemoryWriter::default();
    let mut rendered = Vec::new();
    let mut reports = Vec::new();

    let ok = seq.run(
        &config(&dir.0),
        &mut target,
        &mut |_, t| rendered.push(t),
        &mut writer,
        &mut |p| reports.push((p.frames_done, p.total_frames)),
    );

    assert!(ok);
    let expected: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
    assert_eq!(target.times, expected);
    assert_eq!(rendered, expected);
    assert_eq!(writer.frames.len(), 10);
    assert_eq!(writer.frames[0].0, dir.0.join("frame_00000.raw"));
    assert_eq!(writer.frames[9].0, dir.0.join("frame_00009.raw"));
    assert_eq!(reports.first(), Some(&(1, 10)));
    assert_eq!(reports.last(), Some(&(10, 10)));
    assert!(!seq.is_rendering());
}

#[test]
fn cancellation_stops_and_keeps_written_frames() {
    let dir = ScratchDir::new("cancel");
    let seq = FrameSequencer::new();
    let handle = seq.cancel_handle();
    let mut target = MockTarget::new();
    let mut writer = MemoryWriter::default();

    let ok = seq.run(
        &config(&dir.0),
        &mut target,
        &mut |_, _| {},
        &mut writer,
        &mut |p| {
            if p.frames_done == 3 {
                handle.cancel();
            }
        },
    );

    assert!(!ok);
    assert_eq!(writer.frames.len(), 3);
    assert_eq!(target.times.len(), 3);
    assert!(!seq.is_rendering());
}

#[test]
fn cancel_flag_resets_on_next_run() {
    let dir = ScratchDir::new("reset");
    let seq = FrameSequencer::new();
    seq.cancel();

    let mut target = MockTarget::new();
    let mut writer = MemoryWriter::default();
    let ok = seq.run(&config(&dir.0), &mut target, &mut |_, _| {}, &mut writer, &mut |_| {});
    assert!(ok);
    assert_eq!(writer.frames.len(), 10);
}

#[test]
fn is_rendering_only_during_run() {
    let dir = ScratchDir::new("rendering_flag");
    let seq = FrameSequencer::new();
    let seen = Cell::new(false);
    let mut target = MockTarget::new();
    let mut writer = MemoryWriter::default();
    seq.run(
        &config(&dir.0),
        &mut target,
        &mut |_, _| {},
        &mut writer,
        &mut |_| seen.set(seq.is_rendering()),
    );
    assert!(seen.get());
    assert!(!seq.is_rendering());
}

#[test]
fn invalid_config_renders_nothing() {
    let dir = ScratchDir::new("invalid");
    let seq = FrameSequencer::new();
    let base = config(&dir.0);

    let bad = [
        ExportConfig {
            fps: 0,
            ..base.clone()
        },
        ExportConfig {
            duration: 0.0,
            ..base.clone()
        },
        ExportConfig {
            duration: f32::NAN,
            ..base.clone()
        },
        ExportConfig {
            width: 0,
            ..base.clone()
        },
        // Does not match the target's 2x1.
        ExportConfig {
            width: 4,
            ..base.clone()
        },
    ];
    for cfg in &bad {
        let mut target = MockTarget::new();
        let mut writer = MemoryWriter::default();
        assert!(!seq.run(cfg, &mut target, &mut |_, _| {}, &mut writer, &mut |_| {}));
        assert!(target.times.is_empty(), "{cfg:?}");
        assert!(writer.frames.is_empty(), "{cfg:?}");
    }
}

#[test]
fn capture_failure_aborts() {
    let dir = ScratchDir::new("capture_fail");
    let seq = FrameSequencer::new();
    let mut target = MockTarget::new();
    target.fail_at = Some(4);
    let mut writer = MemoryWriter::default();
    assert!(!seq.run(&config(&dir.0), &mut target, &mut |_, _| {}, &mut writer, &mut |_| {}));
    assert_eq!(writer.frames.len(), 4);
}

#[test]
fn write_failure_aborts() {
    let dir = ScratchDir::new("write_fail");
    let seq = FrameSequencer::new();
    let mut target = MockTarget::new();
    let mut writer = MemoryWriter {
        fail_at: Some(2),
        ..MemoryWriter::default()
    };
    assert!(!seq.run(&config(&dir.0), &mut target, &mut |_, _| {}, &mut writer, &mut |_| {}));
    assert_eq!(target.times.len(), 3);
    assert_eq!(writer.frames.len(), 2);
}

#[test]
fn software_export_is_deterministic() {
    let dir = ScratchDir::new("deterministic");
    let cfg = ExportConfig {
        width: 64,
        height: 32,
        fps: 4,
        duration: 1.0,
        ..config(&dir.0)
    };

    let render_all = || {
        let mut target = SoftwareTarget::new(64, 32, [0.0, 0.0, 0.0, 1.0]);
        target
            .renderer_mut()
            .add_atlas("default", small_atlas())
            .expect("upload");
        let mut writer = MemoryWriter::default();
        let ok = FrameSequencer::new().run(
            &cfg,
            &mut target,
            &mut |r: &mut TextRenderer<SoftwareBackend>, t| {
                r.style_mut().set_light_intensity(t);
                r.draw("Hi", 4.0, 24.0, "default");
            },
            &mut writer,
            &mut |_| {},
        );
        assert!(ok);
        writer.frames
    };

    let a = render_all();
    let b = render_all();
    assert_eq!(a.len(), 4);
    assert_eq!(a, b);
    // Light ramps with time: the first frame is dark, the last is not.
    assert!(a[0].1.chunks(4).all(|px| px[..3] == [0, 0, 0]));
    assert!(a[3].1.chunks(4).any(|px| px[0] > 0));
}

#[test]
fn frame_names_and_counts() {
    assert_eq!(frame_filename("frame_", 7, "png"), "frame_00007.png");
    assert_eq!(frame_filename("shot-", 12345, "png"), "shot-12345.png");
    let cfg = ExportConfig {
        fps: 24,
        duration: 1.04,
        ..ExportConfig::default()
    };
    assert_eq!(cfg.total_frames(), 25);
}

#[test]
fn png_writer_round_trips_dimensions() {
    let dir = ScratchDir::new("png");
    std::fs::create_dir_all(&dir.0).expect("mkdir");
    let path = dir.0.join("f.png");
    let pixels = [255u8, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255];
    PngWriter.write_frame(&pixels, 2, 2, &path).expect("write");
    let img = image::open(&path).expect("decode").to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0, 255]);

    let err = PngWriter.write_frame(&pixels[..8], 2, 2, &path).unwrap_err();
    assert!(matches!(err, ExportError::Encode { .. }));
}

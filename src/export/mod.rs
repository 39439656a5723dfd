//! Offline frame export.
//!
//! [`FrameSequencer::run`] steps a fixed timeline, has an
//! [`OffscreenTarget`] capture each frame through a caller render callback,
//! and hands the pixels to a [`FrameWriter`]. Runs on the caller's thread;
//! only cancellation crosses threads.

mod target;
mod writer;

pub use target::{GpuTarget, SoftwareTarget, align_to, copy_tight_rows};
pub use writer::PngWriter;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Export failures. The sequencer logs them and reports `false`.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("frame readback failed: {0}")]
    Readback(String),
}

/// Timeline and output location of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Seconds.
    pub duration: f32,
    pub output_dir: PathBuf,
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            duration: 8.0,
            output_dir: PathBuf::from("frames"),
            filename_prefix: "frame_".to_owned(),
        }
    }
}

impl ExportConfig {
    /// Number of frames: `round(duration * fps)`.
    pub fn total_frames(&self) -> u32 {
        (self.duration * self.fps as f32).round() as u32
    }

    /// Timestamp of frame `index`, in seconds.
    pub fn frame_time(&self, index: u32) -> f32 {
        index as f32 / self.fps as f32
    }

    fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("invalid frame size {}x{}", self.width, self.height));
        }
        if self.fps == 0 {
            return Err("fps must be positive".to_owned());
        }
        if !(self.duration > 0.0 && self.duration.is_finite()) {
            return Err(format!("invalid duration {}", self.duration));
        }
        Ok(())
    }
}

/// `{prefix}{index:05}.{ext}`.
pub fn frame_filename(prefix: &str, index: u32, extension: &str) -> String {
    format!("{prefix}{index:05}.{extension}")
}

/// Reported after every written frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub frames_done: u32,
    pub total_frames: u32,
    pub elapsed: Duration,
}

/// Something that renders one frame off-screen and returns tightly packed
/// RGBA8 pixels (`width * height * 4` bytes).
pub trait OffscreenTarget {
    type Renderer;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Begin a frame at `time`, run `render`, end the frame, read it back.
    fn capture(
        &mut self,
        time: f32,
        render: &mut dyn FnMut(&mut Self::Renderer, f32),
    ) -> Result<Vec<u8>, ExportError>;
}

/// Encodes one frame to a file.
pub trait FrameWriter {
    fn write_frame(&mut self, pixels: &[u8], width: u32, height: u32, path: &Path)
    -> Result<(), ExportError>;

    /// File extension without the dot.
    fn extension(&self) -> &str;
}

/// Requests cancellation of a running export from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Drives an export. One `run` at a time.
#[derive(Debug, Default)]
pub struct FrameSequencer {
    cancel: Arc<AtomicBool>,
    rendering: AtomicBool,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering.load(Ordering::Relaxed)
    }

    /// Render and write every frame of `config`.
    ///
    /// Returns `true` when all frames were written. Cancellation, invalid
    /// configuration and I/O, capture or encode failures return `false`;
    /// frames already written stay on disk.
    pub fn run<T: OffscreenTarget>(
        &self,
        config: &ExportConfig,
        target: &mut T,
        render: &mut dyn FnMut(&mut T::Renderer, f32),
        writer: &mut dyn FrameWriter,
        progress: &mut dyn FnMut(Progress),
    ) -> bool {
        self.cancel.store(false, Ordering::Relaxed);
        self.rendering.store(true, Ordering::Relaxed);
        let ok = self.run_frames(config, target, render, writer, progress);
        self.rendering.store(false, Ordering::Relaxed);
        ok
    }

    fn run_frames<T: OffscreenTarget>(
        &self,
        config: &ExportConfig,
        target: &mut T,
        render: &mut dyn FnMut(&mut T::Renderer, f32),
        writer: &mut dyn FrameWriter,
        progress: &mut dyn FnMut(Progress),
    ) -> bool {
        if let Err(msg) = config.validate() {
            log::error!("export: {msg}");
            return false;
        }
        if (target.width(), target.height()) != (config.width, config.height) {
            log::error!(
                "export: target is {}x{}, config asks for {}x{}",
                target.width(),
                target.height(),
                config.width,
                config.height,
            );
            return false;
        }
        if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
            log::error!(
                "export: cannot create {}: {e}",
                config.output_dir.display()
            );
            return false;
        }

        let total = config.total_frames();
        let start = Instant::now();
        log::info!(
            "export: {total} frames at {} fps into {}",
            config.fps,
            config.output_dir.display()
        );

        for index in 0..total {
            if self.cancel.load(Ordering::Relaxed) {
                log::info!("export: cancelled after {index} of {total} frames");
                return false;
            }

            let time = config.frame_time(index);
            let pixels = match target.capture(time, render) {
                Ok(p) => p,
                Err(e) => {
                    log::error!("export: frame {index}: {e}");
                    return false;
                }
            };

            let name = frame_filename(&config.filename_prefix, index, writer.extension());
            let path = config.output_dir.join(name);
            if let Err(e) = writer.write_frame(&pixels, config.width, config.height, &path) {
                log::error!("export: frame {index}: {e}");
                return false;
            }

            progress(Progress {
                frames_done: index + 1,
                total_frames: total,
                elapsed: start.elapsed(),
            });
        }

        log::info!("export: done in {:.2}s", start.elapsed().as_secs_f64());
        true
    }
}

#[cfg(test)]
mod tests;

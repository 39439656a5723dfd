//! Signed-distance-field text rendering on the GPU.
//!
//! A font is rasterized once into a single-channel SDF atlas covering
//! printable ASCII; text is then laid out into textured quads and drawn
//! through one of three fragment styles (standard, neon, title) driven by
//! a shared uniform block. An offscreen export path renders animated
//! sequences to numbered PNG frames, on the GPU or with a CPU fallback.

#![deny(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod export;
pub mod font;
pub mod gpu;
pub mod layout;
pub mod render;
pub mod style;

#[cfg(test)]
pub(crate) mod testing;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Debug log file, placed next to the executable.
pub fn log_path() -> PathBuf {
    std::env::current_exe()
        .unwrap_or_default()
        .parent()
        .unwrap_or(Path::new("."))
        .join("lumen_text_debug.log")
}

/// Appends `log` records to the debug log file.
struct FileLogger {
    level: log::LevelFilter,
    file: Mutex<File>,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut f) = self.file.lock() {
            let _ = f.flush();
        }
    }
}

/// Level from `LUMEN_LOG` (`error`..`trace`, or `off`); defaults to `info`.
fn level_from_env() -> log::LevelFilter {
    std::env::var("LUMEN_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}

/// Install the file logger. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let level = level_from_env();
    let file = match OpenOptions::new().create(true).append(true).open(log_path()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("lumentext: cannot open {}: {e}", log_path().display());
            return;
        }
    };
    let logger = FileLogger {
        level,
        file: Mutex::new(file),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

//! Command-line front end: print the config, or export a lit title sequence.

use std::path::PathBuf;
use std::process::ExitCode;

use lumen_text::config::{Config, config_path};
use lumen_text::export::{
    FrameSequencer, GpuTarget, OffscreenTarget, PngWriter, Progress, SoftwareTarget,
};
use lumen_text::font::FontFace;
use lumen_text::gpu::GpuState;
use lumen_text::render::{RenderBackend, RenderError, TextRenderer};

fn print_help() {
    println!("lumentext {}", env!("CARGO_PKG_VERSION"));
    println!("Signed-distance-field text renderer\n");
    println!("USAGE:");
    println!("    lumentext [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --config PATH     Read configuration from PATH");
    println!("    --print-config    Print the effective configuration to stdout");
    println!("    --export          Render the configured sequence to PNG frames");
    println!("    --software        Render on the CPU instead of the GPU");
    println!("    --version, -V     Print version information");
    println!("    --help, -h        Print this help message");
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("lumentext {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    lumen_text::init_logging();

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let Some(path) = args.get(i + 1) else {
                eprintln!("error: --config needs a path");
                return ExitCode::FAILURE;
            };
            match Config::try_load_from(&PathBuf::from(path)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Config::load(),
    };

    if args.iter().any(|a| a == "--print-config") {
        return match config.to_toml() {
            Ok(s) => {
                print!("{s}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if args.iter().any(|a| a == "--export") {
        let software = args.iter().any(|a| a == "--software");
        return match export(&config, software) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => {
                eprintln!("export did not complete; see {}", lumen_text::log_path().display());
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    print_help();
    println!("\nConfig file: {}", config_path().display());
    ExitCode::SUCCESS
}

/// Build the atlas, pick a target and run the sequence.
fn export(config: &Config, software: bool) -> Result<bool, RenderError> {
    let (w, h) = (config.export.width, config.export.height);
    if w == 0 || h == 0 {
        log::error!("export: invalid frame size {w}x{h}");
        return Ok(false);
    }
    let mut face = config.font.open_face()?;
    log::info!("export: font {}", face.source());
    let clear = config.scene.background;

    if !software {
        match GpuState::new_headless() {
            Ok(gpu) => {
                let mut target = GpuTarget::new(&gpu, w, h, clear);
                prepare(target.renderer_mut(), config, &mut face)?;
                return Ok(sequence(config, &mut target));
            }
            Err(e) => {
                log::warn!("export: {e}, falling back to software rendering");
                eprintln!("GPU unavailable ({e}); rendering on the CPU");
            }
        }
    }

    let mut target = SoftwareTarget::new(w, h, clear);
    prepare(target.renderer_mut(), config, &mut face)?;
    Ok(sequence(config, &mut target))
}

fn prepare<B: RenderBackend>(
    renderer: &mut TextRenderer<B>,
    config: &Config,
    face: &mut FontFace,
) -> Result<(), RenderError> {
    renderer.load_with(face, &config.font.atlas_params(), &config.font.alias)?;
    config.style.apply(renderer.style_mut());
    Ok(())
}

fn sequence<B, T>(config: &Config, target: &mut T) -> bool
where
    B: RenderBackend,
    T: OffscreenTarget<Renderer = TextRenderer<B>>,
{
    let (x, y) = config.scene.anchor(target.width(), target.height());
    let text = config.scene.text.as_str();
    let alias = config.font.alias.as_str();
    let light = config.light;

    FrameSequencer::new().run(
        &config.export,
        target,
        &mut |renderer, t| {
            renderer.style_mut().set_light_intensity(light.intensity_at(t));
            renderer.draw(text, x, y, alias);
        },
        &mut PngWriter,
        &mut |p: Progress| {
            eprint!(
                "\rframe {}/{} ({:.1}s)",
                p.frames_done,
                p.total_frames,
                p.elapsed.as_secs_f32()
            );
            if p.frames_done == p.total_frames {
                eprintln!();
            }
        },
    )
}

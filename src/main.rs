//! Headless runner: open an image, restore or import its annotations,
//! render a fitted preview and write every export.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mothra::format::FormatError;
use mothra::persistence::{FileStorage, MemoryStorage, SessionStorage};
use mothra::{Annotator, AppConfig, ImportOutcome, load_image_file};
use mothra_ui::{Event, Renderer, load_system_font};

/// Default preview surface size in logical pixels.
const PREVIEW_SIZE: (f64, f64) = (1280.0, 800.0);

#[derive(Parser, Debug)]
#[command(name = "mothra", about = "Bounding-box annotation sessions: restore, import, render, export")]
struct CliArgs {
    /// Image to annotate (PNG, JPEG, GIF, BMP, TIFF, WebP).
    image: PathBuf,

    /// Session record to import over the restored session.
    #[arg(long, value_name = "RECORD.json")]
    import: Option<PathBuf>,

    /// Directory for exports and the preview render.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Use in-memory storage instead of the session directory.
    #[arg(long)]
    no_persist: bool,
}

fn storage(no_persist: bool) -> Box<dyn SessionStorage> {
    if no_persist {
        return Box::new(MemoryStorage::new());
    }
    match FileStorage::at_default_dir() {
        Some(storage) => Box::new(storage),
        None => {
            log::warn!("No data directory available; sessions will not persist");
            Box::new(MemoryStorage::new())
        }
    }
}

fn run(args: CliArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut annotator = Annotator::new(config, storage(args.no_persist));
    annotator.handle_event(&Event::Resized {
        width: PREVIEW_SIZE.0,
        height: PREVIEW_SIZE.1,
        scale_factor: 1.0,
    });
    annotator.load_image(load_image_file(&args.image)?);

    if let Some(path) = &args.import {
        let data = std::fs::read(path).map_err(FormatError::from)?;
        let outcome = annotator.import_record(&data, |mismatch| {
            log::warn!("{}; importing anyway", mismatch);
            true
        })?;
        if let ImportOutcome::Applied(count) = outcome {
            println!("Imported {} annotations from {}", count, path.display());
        }
        annotator.save_now();
    }

    std::fs::create_dir_all(&args.out)?;
    let mut renderer = Renderer::new(1, 1)?.with_font(load_system_font());
    annotator.frame(&mut renderer)?;
    if let Some(info) = annotator.image().map(|image| image.info()) {
        let preview = args.out.join(format!("{}_preview.png", info.base_name()));
        std::fs::write(&preview, renderer.encode_png()?)?;
        println!("Rendered {}", preview.display());
    }

    for path in annotator.export_all_to(&args.out)? {
        println!("Wrote {}", path.display());
    }

    let status = annotator.status();
    for (class_id, count) in &status.class_counts {
        println!("  {:<8} {}", mothra::model::class_name(*class_id), count);
    }
    Ok(())
}

fn main() -> ExitCode {
    let (config, config_error) = AppConfig::load_or_default_deferred();
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();
    if let Some(e) = config_error {
        log::warn!("Invalid config file, using defaults: {}", e);
    }

    let args = CliArgs::parse();
    match run(args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mothra: {}", e);
            ExitCode::FAILURE
        }
    }
}

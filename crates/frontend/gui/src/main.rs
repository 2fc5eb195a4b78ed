use anyhow::{anyhow, Context, Result};
use clap::Parser;
use framekit_core::logging::{LogCategory, LogConfig};
use framekit_core::{MainLoop, TestPattern};
use framekit_gui::audio_output::RodioRing;
use framekit_gui::settings::Settings;
use framekit_gui::window_backend::MinifbWindow;
use log::LevelFilter;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "framekit", about = "Window, framebuffer, looping audio and gamepads")]
struct Args {
    /// Settings file (defaults to config.json next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to the settings file before starting
    #[arg(long, default_value_t = false)]
    save_config: bool,

    /// Log level: off, error, warn, info, debug or trace (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Per-category level, e.g. `--log-category audio=debug` (repeatable)
    #[arg(long, value_parser = framekit_gui::parse_category_level)]
    log_category: Vec<(LogCategory, LevelFilter)>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.log_level {
        builder.filter_level(level);
    }
    for &(category, level) in &args.log_category {
        builder.filter(Some(category.target()), level);
    }
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();

    // Category filtering follows whatever the logger ended up enabling;
    // env_logger applies the per-target directives on top
    let config = LogConfig::global();
    config.set_global_level(log::max_level());
    for &(category, level) in &args.log_category {
        config.set_level(category, level);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config_path = args.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&config_path);
    settings.validate().context("invalid settings")?;
    if args.save_config {
        settings
            .save_to(&config_path)
            .map_err(|e| anyhow!("saving {}: {}", config_path.display(), e))?;
        log::info!("Settings written to {}", config_path.display());
    }

    // Audio before the window so a missing sound device never shows one
    let ring = framekit_gui::create_ring(&settings)?;
    let audio = RodioRing::open(ring.capacity(), settings.audio.samples_per_second)
        .context("opening audio output")?;

    let window = MinifbWindow::new(
        &settings.window.title,
        settings.window.width,
        settings.window.height,
        settings.window.resizable,
        settings.target_fps,
    )
    .context("creating window")?;

    let controllers = framekit_gui::select_controllers();
    let framebuffer =
        framekit_gui::create_framebuffer(&settings).context("allocating framebuffer")?;

    let mut main_loop = MainLoop::new(
        window,
        audio,
        controllers,
        TestPattern::new(settings.input.rumble),
        framebuffer,
        ring,
        framekit_gui::loop_options(&settings),
    )?;
    main_loop.start_audio().context("starting audio playback")?;
    main_loop.run(args.frames)?;
    Ok(())
}

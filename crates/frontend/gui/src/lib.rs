//! framekit desktop frontend
//!
//! Real devices behind the core traits: a minifb window, a rodio-backed audio
//! ring and gilrs gamepads, plus JSON settings. The `framekit` binary wires
//! them into a [`MainLoop`](framekit_core::MainLoop).

pub mod audio_output;
pub mod gamepad;
pub mod settings;
pub mod window_backend;

use framekit_core::audio::AudioRing;
use framekit_core::graphics::FrameBuffer;
use framekit_core::input::{Controllers, NullInput};
use framekit_core::logging::LogCategory;
use framekit_core::{LoopOptions, Result};
use log::LevelFilter;
use settings::Settings;

/// Loop options derived from settings
pub fn loop_options(settings: &Settings) -> LoopOptions {
    LoopOptions {
        controller_slots: settings.controller_slots(),
        follow_window: settings.buffer.follow_window,
    }
}

/// One second of ring at the configured tone
pub fn create_ring(settings: &Settings) -> Result<AudioRing> {
    AudioRing::one_second(settings.audio)
}

/// Initial framebuffer; follows the window size when configured to
pub fn create_framebuffer(settings: &Settings) -> Result<FrameBuffer> {
    if settings.buffer.follow_window {
        FrameBuffer::new(settings.window.width, settings.window.height)
    } else {
        FrameBuffer::new(settings.buffer.width, settings.buffer.height)
    }
}

/// gilrs when it can be initialised, otherwise a backend with no pads
pub fn select_controllers() -> Box<dyn Controllers> {
    match gamepad::GilrsInput::probe() {
        Some(gilrs) => {
            log::info!("Gamepad backend: gilrs");
            Box::new(gilrs)
        }
        None => {
            log::info!("Gamepad backend: none");
            Box::new(NullInput)
        }
    }
}

/// Parse a `category=level` pair such as `audio=debug`
pub fn parse_category_level(s: &str) -> std::result::Result<(LogCategory, LevelFilter), String> {
    let (name, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=LEVEL, got '{}'", s))?;
    let category = LogCategory::from_name(name.trim())
        .ok_or_else(|| format!("unknown log category '{}'", name))?;
    let level = level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level '{}'", level))?;
    Ok((category, level))
}

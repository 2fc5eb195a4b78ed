use framekit_core::audio::ToneParams;
use framekit_core::error::{Error, Result, Subsystem};
use framekit_core::input::MAX_CONTROLLERS;
use framekit_core::{DEFAULT_BUFFER_HEIGHT, DEFAULT_BUFFER_WIDTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub resizable: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "framekit".to_string(),
            width: DEFAULT_BUFFER_WIDTH,
            height: DEFAULT_BUFFER_HEIGHT,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    pub width: usize,
    pub height: usize,
    /// Re-create the buffer at the client size instead of stretching it
    pub follow_window: bool,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_BUFFER_WIDTH,
            height: DEFAULT_BUFFER_HEIGHT,
            follow_window: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub controller_slots: usize,
    pub rumble: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            controller_slots: MAX_CONTROLLERS,
            rumble: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub buffer: BufferSettings,
    pub audio: ToneParams,
    pub input: InputSettings,
    /// 0 leaves the loop unpaced
    pub target_fps: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            buffer: BufferSettings::default(),
            audio: ToneParams::default(),
            input: InputSettings::default(),
            target_fps: 60,
        }
    }
}

impl Settings {
    /// Get the config file path relative to the executable
    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("config.json");
        path
    }

    /// Load settings from `path`, falling back to defaults on error
    ///
    /// A missing file is normal on first run; a malformed one is reported.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the platform layer cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::setup(
                Subsystem::Config,
                format!(
                    "window size {}x{} is empty",
                    self.window.width, self.window.height
                ),
            ));
        }
        if self.buffer.width == 0 || self.buffer.height == 0 {
            return Err(Error::setup(
                Subsystem::Config,
                format!(
                    "buffer size {}x{} is empty",
                    self.buffer.width, self.buffer.height
                ),
            ));
        }
        self.audio.validate()
    }

    /// Controller slots actually polled
    pub fn controller_slots(&self) -> usize {
        self.input.controller_slots.clamp(1, MAX_CONTROLLERS)
    }
}

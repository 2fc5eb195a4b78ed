//! minifb window: event source and stretch-blit surface

use super::{key_events, map_key};
use framekit_core::error::{Error, Result, Subsystem};
use framekit_core::graphics::FrameBuffer;
use framekit_core::input::Key;
use framekit_core::platform::{Platform, PlatformEvent, PresentationSurface};
use minifb::{KeyRepeat, ScaleMode, Window, WindowOptions};

pub struct MinifbWindow {
    window: Window,
    held_keys: Vec<Key>,
    size: (usize, usize),
    active: bool,
    close_reported: bool,
}

impl MinifbWindow {
    /// Open a window; failure here is fatal to startup
    ///
    /// `target_fps` of 0 leaves presentation unthrottled.
    pub fn new(
        title: &str,
        width: usize,
        height: usize,
        resizable: bool,
        target_fps: usize,
    ) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: resizable,
                scale_mode: ScaleMode::Stretch,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| Error::setup(Subsystem::Window, e.to_string()))?;

        window.set_target_fps(target_fps);

        let size = window.get_size();
        log::info!(
            "Window created: \"{}\" {}x{} (target fps: {})",
            title,
            size.0,
            size.1,
            if target_fps == 0 {
                "unpaced".to_string()
            } else {
                target_fps.to_string()
            }
        );

        Ok(Self {
            window,
            held_keys: Vec::new(),
            size,
            active: true,
            close_reported: false,
        })
    }

    fn current_keys(&self) -> Vec<Key> {
        self.window.get_keys().into_iter().filter_map(map_key).collect()
    }

    fn repeated_keys(&self) -> Vec<Key> {
        self.window
            .get_keys_pressed(KeyRepeat::Yes)
            .into_iter()
            .filter_map(map_key)
            .collect()
    }
}

impl Platform for MinifbWindow {
    fn drain_events(&mut self, events: &mut Vec<PlatformEvent>) {
        if !self.window.is_open() {
            if !self.close_reported {
                self.close_reported = true;
                events.push(PlatformEvent::CloseRequested);
            }
            return;
        }

        let current = self.current_keys();
        let repeated = self.repeated_keys();
        events.extend(key_events(&self.held_keys, &current, &repeated));
        self.held_keys = current;

        let size = self.window.get_size();
        if size != self.size {
            self.size = size;
            events.push(PlatformEvent::Resized {
                width: size.0,
                height: size.1,
            });
        }

        let active = self.window.is_active();
        if active != self.active {
            self.active = active;
            events.push(PlatformEvent::Activated(active));
        }
    }

    fn client_size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    fn name(&self) -> &str {
        "minifb"
    }
}

impl PresentationSurface for MinifbWindow {
    /// minifb stretches the buffer over the whole client area itself
    /// (`ScaleMode::Stretch`), which is the target the loop asks for.
    fn present(
        &mut self,
        buffer: &FrameBuffer,
        _target_width: usize,
        _target_height: usize,
    ) -> Result<()> {
        self.window
            .update_with_buffer(buffer.pixels(), buffer.width(), buffer.height())
            .map_err(|e| Error::transient(Subsystem::Video, e.to_string()))
    }

    /// minifb only pumps OS messages and paces inside its update calls, so a
    /// minimized window still needs one to see restore and close.
    fn idle(&mut self) {
        self.window.update();
    }
}

//! Window-side collaborators of the frame loop
//!
//! A backend provides two things: a non-blocking source of OS events and a
//! surface that stretch-blits a [`FrameBuffer`] onto the client area. Both are
//! traits so the loop can run against a real window or a scripted stand-in.

use crate::graphics::FrameBuffer;
use crate::input::Key;
use crate::Result;

/// Events drained from the platform at the top of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The application-wide quit message
    Quit,
    /// The user asked to close the window
    CloseRequested,
    /// The window was destroyed by the system
    Destroyed,
    /// A key changed state, or auto-repeated while held
    Key {
        key: Key,
        was_down: bool,
        is_down: bool,
        alt_down: bool,
    },
    /// The client area changed size
    Resized { width: usize, height: usize },
    /// The window gained or lost focus
    Activated(bool),
}

impl PlatformEvent {
    /// Whether this event ends the loop on its own
    ///
    /// Besides the close family, Alt+F4 counts as an explicit termination
    /// request.
    pub fn requests_stop(&self) -> bool {
        match self {
            PlatformEvent::Quit | PlatformEvent::CloseRequested | PlatformEvent::Destroyed => true,
            PlatformEvent::Key {
                key: Key::F4,
                is_down: true,
                alt_down: true,
                ..
            } => true,
            _ => false,
        }
    }
}

/// Non-blocking OS event source
pub trait Platform {
    /// Append every pending event to `events` without waiting for new ones
    fn drain_events(&mut self, events: &mut Vec<PlatformEvent>);

    /// Current client area size in pixels, re-queried every frame
    fn client_size(&self) -> (usize, usize);

    /// Get the backend name (for logging)
    fn name(&self) -> &str;
}

/// Scaled blit of the framebuffer onto the window
pub trait PresentationSurface {
    /// Stretch `buffer` to a `target_width` x `target_height` area
    ///
    /// The target may differ from the buffer's own size in either dimension
    /// (non-uniform scale). A failure here costs one displayed frame.
    fn present(
        &mut self,
        buffer: &FrameBuffer,
        target_width: usize,
        target_height: usize,
    ) -> Result<()>;

    /// Called instead of `present` on a frame with nothing to show, such as a
    /// minimized window. Backends that only service the OS inside their blit
    /// must do so here.
    fn idle(&mut self) {}
}

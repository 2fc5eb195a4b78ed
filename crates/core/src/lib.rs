//! Core primitives of the platform layer: framebuffer, audio ring, input model
//! and the frame loop that ties them together.

pub mod app;
pub mod audio;
pub mod error;
pub mod graphics;
pub mod input;
pub mod logging;
pub mod main_loop;
pub mod platform;

pub use app::{FrameHandler, LoopControl, TestPattern};
pub use error::{Error, Result, Subsystem};
pub use main_loop::{FrameStats, LoopOptions, LoopState, MainLoop};

/// Framebuffer width used when nothing else is configured
pub const DEFAULT_BUFFER_WIDTH: usize = 1280;
/// Framebuffer height used when nothing else is configured
pub const DEFAULT_BUFFER_HEIGHT: usize = 720;

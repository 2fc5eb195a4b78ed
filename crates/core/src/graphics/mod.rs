//! CPU-side video buffer and the default pixel routine
//!
//! The frame loop regenerates the whole [`FrameBuffer`] every iteration and hands
//! it to a presentation surface, which stretches it onto the window client area.

pub mod framebuffer;

pub use framebuffer::{FrameBuffer, BYTES_PER_PIXEL};

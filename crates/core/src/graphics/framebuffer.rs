//! Software-rendered pixel buffer
//!
//! Pixels are stored as packed `0x00RRGGBB` words, top-down, one `u32` per
//! pixel. The fourth byte is padding. Rows are tightly packed, so the stride in
//! bytes is always `width * BYTES_PER_PIXEL` and the storage is exactly
//! `stride * height` bytes.
//!
//! # Usage
//!
//! ```
//! use framekit_core::graphics::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new(320, 240).unwrap();
//! buffer.fill_test_pattern(0, 0);
//! assert_eq!(buffer.stride(), 320 * 4);
//! ```

use crate::error::{Error, Result};

/// Bytes per pixel: three color channels plus one byte of padding
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Default)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    /// Byte distance between the start of consecutive rows
    stride: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Allocate a zero-filled buffer of the given geometry
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let mut buffer = Self::default();
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// Release the current storage and allocate fresh zeroed pixels
    ///
    /// Fails with [`Error::OutOfMemory`] when the allocation cannot be made; the
    /// buffer is left empty (0x0) in that case rather than pointing at freed
    /// storage.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.pixels = Vec::new();
        self.width = 0;
        self.height = 0;
        self.stride = 0;

        let count = width.checked_mul(height).ok_or(Error::OutOfMemory {
            what: "framebuffer",
            bytes: usize::MAX,
        })?;
        let bytes = count.saturating_mul(BYTES_PER_PIXEL);

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| Error::OutOfMemory {
                what: "framebuffer",
                bytes,
            })?;
        pixels.resize(count, 0);

        self.pixels = pixels;
        self.width = width;
        self.height = height;
        self.stride = width * BYTES_PER_PIXEL;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row pitch in bytes
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total storage in bytes (`stride * height`)
    pub fn size_in_bytes(&self) -> usize {
        self.stride * self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Overwrite every pixel with the scrolling gradient
    ///
    /// Pixel `(x, y)` becomes `((x + x_offset) mod 256) << 16 | ((y + y_offset) mod 256)`,
    /// i.e. the horizontal ramp lands in the red channel and the vertical ramp in
    /// blue. The offsets wrap, so any value is valid.
    pub fn fill_test_pattern(&mut self, x_offset: u32, y_offset: u32) {
        let words = self.stride / BYTES_PER_PIXEL;
        if words == 0 {
            return;
        }
        for (y, row) in self.pixels.chunks_exact_mut(words).enumerate() {
            let vertical = (y as u32).wrapping_add(y_offset) & 0xFF;
            for (x, pixel) in row.iter_mut().enumerate() {
                let horizontal = (x as u32).wrapping_add(x_offset) & 0xFF;
                *pixel = (horizontal << 16) | vertical;
            }
        }
    }

    /// Fill the whole buffer with one packed color
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

//! Hardware audio contract.
//!
//! A device owns a fixed-capacity looping buffer. Something outside the
//! application thread (a driver, a mixer callback) consumes it and advances the
//! play cursor; the application is the only producer. Producer and consumer
//! never touch the same bytes as long as writes stay between the last filled
//! offset and a freshly read play cursor.

use crate::error::{Error, Result, Subsystem};

/// Hardware-reported positions, as byte offsets into the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursors {
    /// Offset currently being rendered to the speakers
    pub play: usize,
    /// Offset ahead of which writes are safe from audible glitches
    pub write: usize,
}

/// A contiguous byte range inside the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The result of locking `len` bytes at `offset`: the part up to the ring end,
/// and the part that wrapped around to offset 0. Either may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockedRegion {
    pub first: Span,
    pub second: Span,
}

impl LockedRegion {
    /// Split a request into at most two spans against a ring of `capacity` bytes
    pub fn split(offset: usize, len: usize, capacity: usize) -> Result<Self> {
        if offset >= capacity {
            return Err(Error::transient(
                Subsystem::Audio,
                format!("lock offset {} outside ring of {} bytes", offset, capacity),
            ));
        }
        if len > capacity {
            return Err(Error::transient(
                Subsystem::Audio,
                format!("lock of {} bytes exceeds ring of {} bytes", len, capacity),
            ));
        }

        let first_len = len.min(capacity - offset);
        Ok(Self {
            first: Span {
                offset,
                len: first_len,
            },
            second: Span {
                offset: 0,
                len: len - first_len,
            },
        })
    }

    pub fn spans(&self) -> [Span; 2] {
        [self.first, self.second]
    }
}

/// A looping output buffer the application writes ahead of playback
///
/// All offsets and lengths are in bytes. Every per-frame call may fail with
/// [`Error::TransientIo`]; callers skip audio for that frame and carry on.
pub trait AudioDevice {
    /// Ring size in bytes
    fn capacity(&self) -> usize;

    /// Read the current play and write cursors
    fn cursors(&mut self) -> Result<Cursors>;

    /// Reserve `len` bytes starting at `offset` for writing
    fn lock_region(&mut self, offset: usize, len: usize) -> Result<LockedRegion>;

    /// Store interleaved samples into one span of a locked region
    ///
    /// `samples.len() * BYTES_PER_SAMPLE` never exceeds `span.len`.
    fn write_span(&mut self, span: Span, samples: &[i16]) -> Result<()>;

    /// Release a region previously returned by [`lock_region`](Self::lock_region)
    fn unlock(&mut self, region: LockedRegion) -> Result<()>;

    /// Start looping playback from the current play cursor
    fn play(&mut self) -> Result<()>;
}

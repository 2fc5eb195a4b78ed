//! Write-ahead synchronization for a looping audio buffer.
//!
//! Each frame the application reads the play cursor, works out how many bytes
//! lie between its own logical write position and that cursor (wrapping past
//! the ring end when needed), and fills exactly that many bytes. The write
//! position therefore chases the play cursor around the ring and never
//! overtakes it: latency is bounded by one ring traversal and unplayed audio is
//! never overwritten.
//!
//! # Usage
//!
//! ```
//! use framekit_core::audio::{AudioDevice, AudioRing, MemoryDevice, ToneParams};
//!
//! let tone = ToneParams::default();
//! let mut ring = AudioRing::one_second(tone).unwrap();
//! let mut device = MemoryDevice::new(ring.capacity()).unwrap();
//!
//! ring.prime(&mut device, |i| tone.amplitude(i)).unwrap();
//! device.advance(4 * 800);
//!
//! let cursors = device.cursors().unwrap();
//! let region = ring.compute_writable_region(cursors.play, cursors.write).unwrap();
//! assert_eq!(region.byte_count, 4 * 800);
//! ring.fill_region(&mut device, region, |i| tone.amplitude(i)).unwrap();
//! ```

use super::device::{AudioDevice, LockedRegion};
use super::tone::ToneParams;
use super::{BYTES_PER_FRAME, CHANNELS};
use crate::error::{Error, Result, Subsystem};

/// Bytes the application may write this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WritableRegion {
    /// Where the write starts, derived from the running sample index
    pub lock_offset: usize,
    /// How many bytes to write; may wrap past the ring end
    pub byte_count: usize,
}

#[derive(Debug)]
pub struct AudioRing {
    tone: ToneParams,
    /// Total sample frames produced since startup; only ever increments
    running_sample_index: u64,
    capacity: usize,
    /// Reused per-span interleave buffer
    scratch: Vec<i16>,
}

impl AudioRing {
    /// Ring of `capacity` bytes, which must be a positive multiple of the frame size
    pub fn new(tone: ToneParams, capacity: usize) -> Result<Self> {
        tone.validate()?;
        if capacity == 0 || capacity % BYTES_PER_FRAME != 0 {
            return Err(Error::setup(
                Subsystem::Audio,
                format!(
                    "ring capacity {} is not a positive multiple of {}",
                    capacity, BYTES_PER_FRAME
                ),
            ));
        }
        Ok(Self {
            tone,
            running_sample_index: 0,
            capacity,
            scratch: Vec::new(),
        })
    }

    /// Ring holding exactly one second of audio at the tone's sample rate
    pub fn one_second(tone: ToneParams) -> Result<Self> {
        let capacity = (tone.samples_per_second as usize).saturating_mul(BYTES_PER_FRAME);
        Self::new(tone, capacity)
    }

    pub fn tone(&self) -> &ToneParams {
        &self.tone
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bytes_per_frame(&self) -> usize {
        BYTES_PER_FRAME
    }

    pub fn running_sample_index(&self) -> u64 {
        self.running_sample_index
    }

    /// Byte offset the next sample frame will be written to
    pub fn lock_offset(&self) -> usize {
        let frames_in_ring = (self.capacity / BYTES_PER_FRAME) as u64;
        ((self.running_sample_index % frames_in_ring) as usize) * BYTES_PER_FRAME
    }

    /// Region between the logical write position and a freshly read play cursor
    ///
    /// - write position == play cursor: nothing queued ahead of playback yet
    ///   (or the ring is exactly full), so write nothing
    /// - write position ahead of the cursor: the region wraps the ring end
    /// - write position behind the cursor: write up to the cursor
    ///
    /// The write cursor is accepted for completeness but does not move the
    /// boundary; the play cursor alone bounds the region.
    pub fn compute_writable_region(
        &self,
        play_cursor: usize,
        _write_cursor: usize,
    ) -> Result<WritableRegion> {
        if play_cursor >= self.capacity {
            return Err(Error::transient(
                Subsystem::Audio,
                format!(
                    "play cursor {} outside ring of {} bytes",
                    play_cursor, self.capacity
                ),
            ));
        }

        let lock_offset = self.lock_offset();
        let byte_count = if lock_offset == play_cursor {
            0
        } else if lock_offset > play_cursor {
            (self.capacity - lock_offset) + play_cursor
        } else {
            play_cursor - lock_offset
        };

        Ok(WritableRegion {
            lock_offset,
            byte_count,
        })
    }

    /// Generate and store `region.byte_count` bytes of audio
    ///
    /// The region is locked as at most two spans. The first span is filled
    /// completely before the second, so the running sample index carries across
    /// the wrap. Each span's loop bound is its own size in sample frames. The
    /// generator's value for a frame is written to every channel. Returns the
    /// number of sample frames written. On error the write position is left
    /// where it was and the lock is released.
    pub fn fill_region<D, G>(
        &mut self,
        device: &mut D,
        region: WritableRegion,
        mut generator: G,
    ) -> Result<usize>
    where
        D: AudioDevice + ?Sized,
        G: FnMut(u64) -> i16,
    {
        if region.byte_count == 0 {
            return Ok(0);
        }

        let locked = device.lock_region(region.lock_offset, region.byte_count)?;
        let start_index = self.running_sample_index;
        match self.fill_locked(device, locked, &mut generator) {
            Ok(frames_written) => Ok(frames_written),
            Err(e) => {
                // Nothing counts as written, so the next frame retries the region
                self.running_sample_index = start_index;
                Err(e)
            }
        }
    }

    fn fill_locked<D, G>(
        &mut self,
        device: &mut D,
        locked: LockedRegion,
        generator: &mut G,
    ) -> Result<usize>
    where
        D: AudioDevice + ?Sized,
        G: FnMut(u64) -> i16,
    {
        let mut frames_written = 0;

        for span in locked.spans() {
            let frame_count = span.len / BYTES_PER_FRAME;
            self.scratch.clear();
            self.scratch.reserve(frame_count * CHANNELS);
            for _ in 0..frame_count {
                let value = generator(self.running_sample_index);
                for _ in 0..CHANNELS {
                    self.scratch.push(value);
                }
                self.running_sample_index += 1;
            }
            if !self.scratch.is_empty() {
                if let Err(e) = device.write_span(span, &self.scratch) {
                    let _ = device.unlock(locked);
                    return Err(e);
                }
            }
            frames_written += frame_count;
        }

        device.unlock(locked)?;
        Ok(frames_written)
    }

    /// Fill the entire ring from the current write position
    ///
    /// Used once before playback starts so the first frames have audio queued.
    pub fn prime<D, G>(&mut self, device: &mut D, generator: G) -> Result<usize>
    where
        D: AudioDevice + ?Sized,
        G: FnMut(u64) -> i16,
    {
        let region = WritableRegion {
            lock_offset: self.lock_offset(),
            byte_count: self.capacity,
        };
        self.fill_region(device, region, generator)
    }
}

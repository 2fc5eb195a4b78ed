//! In-process looping ring implementing [`AudioDevice`].
//!
//! Nothing drains it on its own: whoever owns it moves the play cursor with
//! [`MemoryDevice::advance`]. Failure switches let tests exercise the
//! transient-error paths of the frame loop.

use super::device::{AudioDevice, Cursors, LockedRegion, Span};
use super::{BYTES_PER_FRAME, BYTES_PER_SAMPLE};
use crate::error::{Error, Result, Subsystem};

#[derive(Debug)]
pub struct MemoryDevice {
    samples: Vec<i16>,
    play_cursor: usize,
    /// Distance of the write cursor ahead of the play cursor, in bytes
    write_lead: usize,
    playing: bool,
    locked: Option<LockedRegion>,
    fail_cursors: bool,
    fail_lock: bool,
    /// Span writes accepted before writes start failing
    writes_before_failure: Option<usize>,
    locks: usize,
}

impl MemoryDevice {
    /// Ring of `capacity` bytes; must be a non-zero multiple of the frame size
    pub fn new(capacity: usize) -> Result<Self> {
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
            samples: vec![0; capacity / BYTES_PER_SAMPLE],
            play_cursor: 0,
            write_lead: BYTES_PER_FRAME,
            playing: false,
            locked: None,
            fail_cursors: false,
            fail_lock: false,
            writes_before_failure: None,
            locks: 0,
        })
    }

    /// Consume `bytes` of audio, wrapping at the ring end
    pub fn advance(&mut self, bytes: usize) {
        self.play_cursor = (self.play_cursor + bytes) % self.capacity();
    }

    /// Place the play cursor at an absolute offset
    pub fn set_play_cursor(&mut self, offset: usize) {
        self.play_cursor = offset % self.capacity();
    }

    pub fn set_fail_cursors(&mut self, fail: bool) {
        self.fail_cursors = fail;
    }

    pub fn set_fail_lock(&mut self, fail: bool) {
        self.fail_lock = fail;
    }

    pub fn set_fail_write(&mut self, fail: bool) {
        self.writes_before_failure = fail.then_some(0);
    }

    /// Accept `writes` more span writes, then refuse every one after
    pub fn set_fail_write_after(&mut self, writes: usize) {
        self.writes_before_failure = Some(writes);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Number of successful locks so far
    pub fn lock_count(&self) -> usize {
        self.locks
    }

    /// Interleaved ring contents
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample of `channel` in the frame starting at byte `offset`
    pub fn frame_sample(&self, offset: usize, channel: usize) -> i16 {
        self.samples[offset / BYTES_PER_SAMPLE + channel]
    }
}

impl AudioDevice for MemoryDevice {
    fn capacity(&self) -> usize {
        self.samples.len() * BYTES_PER_SAMPLE
    }

    fn cursors(&mut self) -> Result<Cursors> {
        if self.fail_cursors {
            return Err(Error::transient(Subsystem::Audio, "cursor query refused"));
        }
        Ok(Cursors {
            play: self.play_cursor,
            write: (self.play_cursor + self.write_lead) % self.capacity(),
        })
    }

    fn lock_region(&mut self, offset: usize, len: usize) -> Result<LockedRegion> {
        if self.fail_lock {
            return Err(Error::transient(Subsystem::Audio, "region lock refused"));
        }
        if self.locked.is_some() {
            return Err(Error::transient(Subsystem::Audio, "ring is already locked"));
        }
        let region = LockedRegion::split(offset, len, self.capacity())?;
        self.locked = Some(region);
        self.locks += 1;
        Ok(region)
    }

    fn write_span(&mut self, span: Span, samples: &[i16]) -> Result<()> {
        let locked = self
            .locked
            .ok_or_else(|| Error::transient(Subsystem::Audio, "write outside a lock"))?;
        if span != locked.first && span != locked.second {
            return Err(Error::transient(Subsystem::Audio, "span was not locked"));
        }
        match self.writes_before_failure {
            Some(0) => return Err(Error::transient(Subsystem::Audio, "span write refused")),
            Some(n) => self.writes_before_failure = Some(n - 1),
            None => {}
        }
        if samples.len() * BYTES_PER_SAMPLE > span.len {
            return Err(Error::transient(Subsystem::Audio, "write overruns span"));
        }
        let start = span.offset / BYTES_PER_SAMPLE;
        self.samples[start..start + samples.len()].copy_from_slice(samples);
        Ok(())
    }

    fn unlock(&mut self, region: LockedRegion) -> Result<()> {
        match self.locked {
            Some(locked) if locked == region => {
                self.locked = None;
                Ok(())
            }
            _ => Err(Error::transient(Subsystem::Audio, "unlock of a region not held")),
        }
    }

    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }
}

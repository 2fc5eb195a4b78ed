//! Looping hardware ring on top of rodio
//!
//! The ring lives in shared atomics. The application thread writes spans of it
//! through [`AudioDevice`]; rodio's output thread reads it in a loop through
//! [`RingSource`] and publishes how far it got as the play cursor. The two
//! sides touch disjoint regions because the writer never passes the cursor.

use framekit_core::audio::{
    AudioDevice, Cursors, LockedRegion, Span, BYTES_PER_FRAME, BYTES_PER_SAMPLE, CHANNELS,
};
use framekit_core::error::{Error, Result, Subsystem};
use rodio::{OutputStream, OutputStreamHandle, Source};
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicUsize, Ordering};
use std::sync::Arc;

/// Ring memory shared with the output thread
struct SharedRing {
    samples: Vec<AtomicI16>,
    /// Sample frame the reader will play next
    play_frame: AtomicUsize,
    stopped: AtomicBool,
}

impl SharedRing {
    fn new(capacity: usize) -> Self {
        Self {
            samples: (0..capacity / BYTES_PER_SAMPLE)
                .map(|_| AtomicI16::new(0))
                .collect(),
            play_frame: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    fn play_cursor(&self) -> usize {
        self.play_frame.load(Ordering::Acquire) * BYTES_PER_FRAME
    }
}

/// Endless interleaved reader over the ring
///
/// Never returns `None` while the device is alive, so rodio keeps it playing.
pub struct RingSource {
    ring: Arc<SharedRing>,
    position: usize,
    sample_rate: u32,
}

impl Iterator for RingSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.ring.stopped.load(Ordering::Relaxed) {
            return None;
        }
        let sample = self.ring.samples[self.position].load(Ordering::Relaxed);
        self.position = (self.position + 1) % self.ring.samples.len();
        if self.position % CHANNELS == 0 {
            self.ring
                .play_frame
                .store(self.position / CHANNELS, Ordering::Release);
        }
        Some(sample)
    }
}

impl Source for RingSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS as u16
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<std::time::Duration> {
        None
    }
}

pub struct RodioRing {
    ring: Arc<SharedRing>,
    capacity: usize,
    sample_rate: u32,
    locked: Option<LockedRegion>,
    playing: bool,
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioRing {
    /// Open the default output device with a ring of `capacity` bytes
    pub fn open(capacity: usize, sample_rate: u32) -> Result<Self> {
        if capacity == 0 || capacity % BYTES_PER_FRAME != 0 {
            return Err(Error::setup(
                Subsystem::Audio,
                format!("ring capacity {} is not whole sample frames", capacity),
            ));
        }
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::setup(Subsystem::Audio, e.to_string()))?;
        log::info!(
            "Audio output opened: {} Hz, {} channels, {} byte ring",
            sample_rate,
            CHANNELS,
            capacity
        );

        Ok(Self {
            ring: Arc::new(SharedRing::new(capacity)),
            capacity,
            sample_rate,
            locked: None,
            playing: false,
            _stream: stream,
            handle,
        })
    }

    fn source(&self) -> RingSource {
        RingSource {
            ring: Arc::clone(&self.ring),
            position: 0,
            sample_rate: self.sample_rate,
        }
    }
}

impl AudioDevice for RodioRing {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn cursors(&mut self) -> Result<Cursors> {
        let play = self.ring.play_cursor();
        Ok(Cursors {
            play,
            write: (play + BYTES_PER_FRAME) % self.capacity,
        })
    }

    fn lock_region(&mut self, offset: usize, len: usize) -> Result<LockedRegion> {
        if self.locked.is_some() {
            return Err(Error::transient(Subsystem::Audio, "ring is already locked"));
        }
        let region = LockedRegion::split(offset, len, self.capacity)?;
        self.locked = Some(region);
        Ok(region)
    }

    fn write_span(&mut self, span: Span, samples: &[i16]) -> Result<()> {
        write_locked(&self.ring, self.locked, span, samples)
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
        if self.playing {
            return Ok(());
        }
        self.handle
            .play_raw(self.source().convert_samples())
            .map_err(|e| Error::setup(Subsystem::Audio, e.to_string()))?;
        self.playing = true;
        Ok(())
    }
}

impl Drop for RodioRing {
    fn drop(&mut self) {
        self.ring.stopped.store(true, Ordering::Relaxed);
    }
}

fn write_locked(
    ring: &SharedRing,
    locked: Option<LockedRegion>,
    span: Span,
    samples: &[i16],
) -> Result<()> {
    let locked =
        locked.ok_or_else(|| Error::transient(Subsystem::Audio, "write outside a lock"))?;
    if span != locked.first && span != locked.second {
        return Err(Error::transient(Subsystem::Audio, "span was not locked"));
    }
    if samples.len() * BYTES_PER_SAMPLE > span.len {
        return Err(Error::transient(Subsystem::Audio, "write overruns span"));
    }
    let start = span.offset / BYTES_PER_SAMPLE;
    for (slot, &sample) in ring.samples[start..start + samples.len()]
        .iter()
        .zip(samples)
    {
        slot.store(sample, Ordering::Relaxed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(ring: &Arc<SharedRing>) -> RingSource {
        RingSource {
            ring: Arc::clone(ring),
            position: 0,
            sample_rate: 48_000,
        }
    }

    #[test]
    fn test_source_reads_interleaved_and_moves_cursor() {
        let ring = Arc::new(SharedRing::new(16));
        let region = LockedRegion::split(0, 16, 16).unwrap();
        write_locked(&ring, Some(region), region.first, &[1, 1, 2, 2, 3, 3, 4, 4]).unwrap();

        let mut src = source(&ring);
        assert_eq!(src.next(), Some(1));
        assert_eq!(ring.play_cursor(), 0, "cursor moves per whole frame");
        assert_eq!(src.next(), Some(1));
        assert_eq!(ring.play_cursor(), BYTES_PER_FRAME);
        let rest: Vec<i16> = src.by_ref().take(6).collect();
        assert_eq!(rest, vec![2, 2, 3, 3, 4, 4]);
        assert_eq!(ring.play_cursor(), 0, "reader loops back to the start");
        assert_eq!(src.next(), Some(1));
    }

    #[test]
    fn test_source_format() {
        let ring = Arc::new(SharedRing::new(16));
        let src = source(&ring);
        assert_eq!(src.channels(), 2);
        assert_eq!(src.sample_rate(), 48_000);
        assert_eq!(src.total_duration(), None);
    }

    #[test]
    fn test_source_ends_when_stopped() {
        let ring = Arc::new(SharedRing::new(16));
        let mut src = source(&ring);
        ring.stopped.store(true, Ordering::Relaxed);
        assert_eq!(src.next(), None);
    }

    #[test]
    fn test_write_requires_a_locked_span() {
        let ring = SharedRing::new(16);
        let region = LockedRegion::split(12, 8, 16).unwrap();
        assert!(write_locked(&ring, None, region.first, &[0, 0]).is_err());
        assert!(write_locked(
            &ring,
            Some(region),
            Span { offset: 4, len: 4 },
            &[0, 0]
        )
        .is_err());
        assert!(write_locked(&ring, Some(region), region.first, &[0, 0, 0]).is_err());

        write_locked(&ring, Some(region), region.first, &[7, 7]).unwrap();
        write_locked(&ring, Some(region), region.second, &[9, 9]).unwrap();
        assert_eq!(ring.samples[6].load(Ordering::Relaxed), 7);
        assert_eq!(ring.samples[0].load(Ordering::Relaxed), 9);
    }
}

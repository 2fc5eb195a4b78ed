//! Looping audio ring and the hardware contract it writes through.
//!
//! ## Components
//!
//! - **ToneParams**: sample rate, tone frequency and volume of the test tone
//! - **AudioDevice**: a looping hardware buffer exposing play/write cursors
//!   and a two-span lock over arbitrary (possibly wrapping) byte ranges
//! - **MemoryDevice**: an in-process ring implementing `AudioDevice`, used for
//!   headless runs and tests
//! - **AudioRing**: keeps the ring filled up to the play cursor, one sample
//!   frame at a time, from a pure `sample_index -> i16` generator
//!
//! ## Format
//!
//! Interleaved signed 16-bit PCM, two channels. A sample frame is one sample
//! per channel, so four bytes.

pub mod device;
pub mod memory;
pub mod ring;
pub mod tone;

pub use device::{AudioDevice, Cursors, LockedRegion, Span};
pub use memory::MemoryDevice;
pub use ring::{AudioRing, WritableRegion};
pub use tone::ToneParams;

/// Output channel count
pub const CHANNELS: usize = 2;

/// Bytes per single-channel sample (16-bit PCM)
pub const BYTES_PER_SAMPLE: usize = std::mem::size_of::<i16>();

/// Bytes per sample frame (one sample for every channel)
pub const BYTES_PER_FRAME: usize = CHANNELS * BYTES_PER_SAMPLE;

//! Sine tone parameters and the default sample generator.

use crate::error::{Error, Result, Subsystem};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLES_PER_SECOND: u32 = 48_000;
/// Roughly middle C
pub const DEFAULT_TONE_HZ: u32 = 262;
pub const DEFAULT_TONE_VOLUME: i16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParams {
    pub samples_per_second: u32,
    pub tone_hz: u32,
    /// Peak amplitude
    pub tone_volume: i16,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            samples_per_second: DEFAULT_SAMPLES_PER_SECOND,
            tone_hz: DEFAULT_TONE_HZ,
            tone_volume: DEFAULT_TONE_VOLUME,
        }
    }
}

impl ToneParams {
    /// Reject parameters that cannot produce a sampled tone
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_second == 0 {
            return Err(Error::setup(Subsystem::Config, "samples_per_second must be non-zero"));
        }
        if self.tone_hz == 0 {
            return Err(Error::setup(Subsystem::Config, "tone_hz must be non-zero"));
        }
        if self.tone_hz > self.samples_per_second / 2 {
            return Err(Error::setup(
                Subsystem::Config,
                format!(
                    "tone_hz {} is above the Nyquist limit for {} Hz",
                    self.tone_hz, self.samples_per_second
                ),
            ));
        }
        Ok(())
    }

    /// Samples per oscillation (integer, truncated)
    pub fn wave_period(&self) -> u32 {
        (self.samples_per_second / self.tone_hz.max(1)).max(1)
    }

    /// Amplitude of the tone at an absolute sample index
    ///
    /// Pure in `sample_index`: the same index always yields the same value. The
    /// phase is reduced modulo the integer wave period first, so precision does
    /// not degrade as the index grows.
    pub fn amplitude(&self, sample_index: u64) -> i16 {
        let period = u64::from(self.wave_period());
        let phase = (sample_index % period) as f64 / period as f64;
        let value = (std::f64::consts::TAU * phase).sin() * f64::from(self.tone_volume);
        value.round() as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wave_period() {
        let tone = ToneParams::default();
        assert_eq!(tone.wave_period(), 48_000 / 262);
    }

    #[test]
    fn test_amplitude_is_pure() {
        let tone = ToneParams::default();
        let forward: Vec<i16> = (0..1000).map(|i| tone.amplitude(i)).collect();
        let backward: Vec<i16> = (0..1000).rev().map(|i| tone.amplitude(i)).collect();
        for (i, value) in forward.iter().enumerate() {
            assert_eq!(*value, backward[999 - i], "index {} changed with call order", i);
            assert_eq!(*value, tone.amplitude(i as u64));
        }
    }

    #[test]
    fn test_amplitude_shape() {
        let tone = ToneParams {
            samples_per_second: 400,
            tone_hz: 1,
            tone_volume: 1000,
        };
        assert_eq!(tone.amplitude(0), 0);
        assert_eq!(tone.amplitude(100), 1000);
        assert_eq!(tone.amplitude(200), 0);
        assert_eq!(tone.amplitude(300), -1000);
        // One full period later repeats exactly
        assert_eq!(tone.amplitude(100 + 400 * 1_000_000), 1000);
    }

    #[test]
    fn test_amplitude_never_exceeds_volume() {
        let tone = ToneParams::default();
        for i in 0..u64::from(tone.wave_period()) {
            assert!(tone.amplitude(i).unsigned_abs() <= tone.tone_volume as u16);
        }
    }

    #[test]
    fn test_validate() {
        assert!(ToneParams::default().validate().is_ok());

        let silent = ToneParams {
            tone_hz: 0,
            ..Default::default()
        };
        assert!(silent.validate().unwrap_err().is_fatal());

        let too_high = ToneParams {
            tone_hz: 30_000,
            ..Default::default()
        };
        assert!(too_high.validate().is_err());

        let no_rate = ToneParams {
            samples_per_second: 0,
            ..Default::default()
        };
        assert!(no_rate.validate().is_err());
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use super::sample::Sample;

/// Fixed capture/playback parameters of the device.
///
/// Defaults mirror the reference board: a 48 MHz ADC clock divided by 2000,
/// a three second window transferred in quarter-second blocks, a 10-bit PWM
/// slice driving the buzzer and a 128x64 display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Sampling rate in Hz (default: 24000).
    pub sample_rate: u32,

    /// Capture window in whole seconds (default: 3).
    pub record_secs: u32,

    /// Transfer blocks per second of audio (default: 4).
    pub blocks_per_second: u32,

    /// ADC input the microphone is wired to (default: 2).
    pub input_channel: u8,

    /// Significant bits per sample (default: 12). Valid values: 8, 10, 12, 16.
    pub sample_bits: u8,

    /// PWM counter wrap, i.e. the maximum duty level (default: 1023).
    pub pwm_wrap: u16,

    /// Playback gain applied before saturation (default: 1.5). Must exceed 1.
    pub playback_gain: f32,

    /// Bar-graph columns (default: 128).
    pub display_columns: usize,

    /// Bar-graph rows, the tallest bar (default: 64).
    pub display_rows: u16,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.record_secs == 0 {
            return Err("capture window must be at least one second".into());
        }
        if self.blocks_per_second == 0 || self.blocks_per_second > self.sample_rate {
            return Err(format!("unsupported block rate: {}", self.blocks_per_second));
        }
        if self.sample_rate % self.blocks_per_second != 0 {
            return Err(format!(
                "block rate {} does not divide sample rate {}",
                self.blocks_per_second, self.sample_rate
            ));
        }
        if ![8, 10, 12, 16].contains(&self.sample_bits) {
            return Err(format!("unsupported sample width: {}", self.sample_bits));
        }
        if self.pwm_wrap == 0 {
            return Err("pwm wrap must be positive".into());
        }
        if !(self.playback_gain > 1.0 && self.playback_gain.is_finite()) {
            return Err(format!("playback gain must exceed 1: {}", self.playback_gain));
        }
        if self.display_columns == 0 || self.display_rows == 0 {
            return Err("display must have at least one column and one row".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, RecorderError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RecorderError::InvalidConfig(format!("failed to parse config: {}", e)))?;
        config.validate().map_err(RecorderError::InvalidConfig)?;
        Ok(config)
    }

    /// Total samples in the capture window.
    pub fn capacity(&self) -> usize {
        self.sample_rate as usize * self.record_secs as usize
    }

    /// Samples per transfer block.
    pub fn block_size(&self) -> usize {
        (self.sample_rate / self.blocks_per_second) as usize
    }

    /// Playback timer period, one sample.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.sample_rate.max(1)))
    }

    /// Largest sample value the converter produces.
    pub fn full_scale(&self) -> Sample {
        ((1u32 << self.sample_bits) - 1) as Sample
    }

    /// Sample value of zero amplitude.
    pub fn silence_midpoint(&self) -> Sample {
        (1u32 << (self.sample_bits - 1)) as Sample
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000_000 / 2000,
            record_secs: 3,
            blocks_per_second: 4,
            input_channel: 2,
            sample_bits: 12,
            pwm_wrap: 1023,
            playback_gain: 1.5,
            display_columns: 128,
            display_rows: 64,
        }
    }
}

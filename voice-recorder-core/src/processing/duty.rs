use crate::models::config::RecorderConfig;
use crate::models::sample::Sample;

/// Pure-math conversion from captured samples to PWM duty levels.
///
/// `duty = min(sample / full_scale * max_duty * gain, max_duty)`
///
/// The gain compensates for the buzzer's attenuation; the result saturates
/// rather than wraps, so every output lies in `0..=max_duty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyMapper {
    pub full_scale: Sample,
    pub max_duty: u16,
    pub gain: f32,
}

impl DutyMapper {
    pub fn new(full_scale: Sample, max_duty: u16, gain: f32) -> Self {
        Self {
            full_scale: full_scale.max(1),
            max_duty,
            gain,
        }
    }

    pub fn from_config(config: &RecorderConfig, max_duty: u16) -> Self {
        Self::new(config.full_scale(), max_duty, config.playback_gain)
    }

    pub fn map(&self, sample: Sample) -> u16 {
        let normalized = f32::from(sample) / f32::from(self.full_scale);
        let level = normalized * f32::from(self.max_duty) * self.gain;
        // Float-to-int `as` saturates; the min keeps us under the wrap.
        (level.min(f32::from(self.max_duty))) as u16
    }
}

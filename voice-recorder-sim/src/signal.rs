use std::f64::consts::TAU;

use voice_recorder_core::Sample;

/// Synthetic microphone input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Constant midpoint reading.
    Silence,

    /// Sine tone; `amplitude` is a fraction of full swing, 0.0–1.0.
    Tone { frequency_hz: f64, amplitude: f64 },

    /// Fixed raw reading, useful for checking the duty mapping.
    Constant(Sample),
}

impl Signal {
    /// Reading number `index` from a converter with `bits` of resolution.
    pub fn sample_at(&self, index: u64, sample_rate: u32, bits: u8) -> Sample {
        let full_scale = ((1u32 << bits) - 1) as f64;
        let midpoint = f64::from(1u32 << (bits - 1));
        match *self {
            Signal::Silence => midpoint as Sample,
            Signal::Constant(value) => value.min(full_scale as Sample),
            Signal::Tone {
                frequency_hz,
                amplitude,
            } => {
                let t = index as f64 / f64::from(sample_rate.max(1));
                let swing = amplitude.clamp(0.0, 1.0) * midpoint;
                let value = midpoint + swing * (TAU * frequency_hz * t).sin();
                value.round().clamp(0.0, full_scale) as Sample
            }
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::Tone {
            frequency_hz: 440.0,
            amplitude: 0.5,
        }
    }
}

use std::time::Duration;

/// Maps device time onto wall-clock time.
///
/// A `speedup` of 10 runs every simulated peripheral ten times faster than
/// real hardware, which keeps tests short without changing sample counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub speedup: f64,
}

impl SimClock {
    pub fn real_time() -> Self {
        Self { speedup: 1.0 }
    }

    pub fn with_speedup(speedup: f64) -> Self {
        Self {
            speedup: if speedup.is_finite() && speedup > 0.0 { speedup } else { 1.0 },
        }
    }

    /// Wall-clock duration of `device` time.
    pub fn scale(&self, device: Duration) -> Duration {
        device.div_f64(self.speedup)
    }

    /// Wall-clock duration of `samples` conversions at `sample_rate`.
    pub fn samples(&self, samples: usize, sample_rate: u32) -> Duration {
        self.scale(Duration::from_secs_f64(samples as f64 / f64::from(sample_rate.max(1))))
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::real_time()
    }
}

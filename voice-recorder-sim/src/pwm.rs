//! Simulated PWM slice driving the buzzer.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use voice_recorder_core::PwmOutput;

struct PwmState {
    wrap: u16,
    level: AtomicU16,
    history: Mutex<Vec<u16>>,
}

/// Simulated PWM output. Records every duty level written.
#[derive(Clone)]
pub struct SimPwm {
    state: Arc<PwmState>,
}

impl SimPwm {
    pub fn new(wrap: u16) -> Self {
        Self {
            state: Arc::new(PwmState {
                wrap,
                level: AtomicU16::new(0),
                history: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Current duty level.
    pub fn level(&self) -> u16 {
        self.state.level.load(Ordering::SeqCst)
    }

    /// Every level written since construction (or the last `clear_history`).
    pub fn history(&self) -> Vec<u16> {
        self.state.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.state.history.lock().clear();
    }
}

impl PwmOutput for SimPwm {
    fn set_duty(&self, level: u16) {
        let level = level.min(self.state.wrap);
        self.state.level.store(level, Ordering::SeqCst);
        self.state.history.lock().push(level);
    }

    fn max_duty(&self) -> u16 {
        self.state.wrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_clamped_to_wrap() {
        let pwm = SimPwm::new(1023);
        pwm.set_duty(5000);
        pwm.set_duty(12);

        assert_eq!(pwm.level(), 12);
        assert_eq!(pwm.history(), vec![1023, 12]);
    }
}

//! RGB status LED.

use parking_lot::Mutex;

use voice_recorder_core::{Session, StatusIndicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Off,
    Red,
    Green,
}

impl From<Session> for LedColor {
    fn from(session: Session) -> Self {
        match session {
            Session::Idle => LedColor::Off,
            Session::Recording => LedColor::Red,
            Session::Playing => LedColor::Green,
        }
    }
}

/// Simulated RGB LED: red while recording, green while playing, off when idle.
#[derive(Debug, Default)]
pub struct RgbLed {
    history: Mutex<Vec<LedColor>>,
}

impl RgbLed {
    pub fn color(&self) -> LedColor {
        self.history.lock().last().copied().unwrap_or(LedColor::Off)
    }

    pub fn history(&self) -> Vec<LedColor> {
        self.history.lock().clone()
    }
}

impl StatusIndicator for RgbLed {
    fn set_state(&self, session: Session) {
        self.history.lock().push(session.into());
    }
}

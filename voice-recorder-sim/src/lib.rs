//! # voice-recorder-sim
//!
//! Host simulation backend for voice-recorder.
//!
//! Provides:
//! - `SimAdc`: free-running converter sampling a synthetic `Signal`
//! - `SimDma`: block transfers paced by the ADC, completing on a `sim-dma` thread
//! - `SimPwm`: PWM output recording every duty level
//! - `SimTimer`: repeating alarm on a `sim-timer` thread
//! - `FrameLog` / `RgbLed`: display and status LED sinks
//! - `SimBoard`: everything wired to a `SessionController`
//!
//! Threads stand in for interrupts, so the core runs against genuinely
//! concurrent handlers. `SimClock` compresses device time for tests.
//!
//! ## Usage
//! ```no_run
//! use std::time::Duration;
//! use voice_recorder_core::RecorderConfig;
//! use voice_recorder_sim::{SimBoard, SimClock, Signal};
//!
//! let mut board = SimBoard::new(RecorderConfig::default(), Signal::default(), SimClock::real_time()).unwrap();
//! board.controller().start_recording().unwrap();
//! board.run_until_idle(Duration::from_secs(5));
//! board.controller().start_playback().unwrap();
//! board.run_until_idle(Duration::from_secs(5));
//! ```

pub mod adc;
pub mod board;
pub mod clock;
pub mod display;
pub mod dma;
pub mod pwm;
pub mod signal;
pub mod status;
pub mod timer;

pub use adc::SimAdc;
pub use board::{SimBoard, SimController};
pub use clock::SimClock;
pub use display::FrameLog;
pub use dma::SimDma;
pub use pwm::SimPwm;
pub use signal::Signal;
pub use status::{LedColor, RgbLed};
pub use timer::SimTimer;

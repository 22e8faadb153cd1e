//! # voice-recorder-core
//!
//! Platform-agnostic record/playback core for a microphone-to-buzzer voice
//! recorder.
//!
//! Samples are captured by chaining fixed-size DMA blocks into a linear
//! buffer, replayed one sample per timer tick through a PWM output, and
//! summarized into bar-graph frames for a small display. Hardware backends
//! (RP2040 peripherals, or the host simulation in `voice-recorder-sim`)
//! implement the peripheral traits and forward their interrupts to the
//! `SessionController`.
//!
//! ## Architecture
//!
//! ```text
//! voice-recorder-core (this crate)
//! ├── traits/         ← SamplingPeripheral, BlockTransferEngine, PwmOutput, PeriodicTimer, Display, StatusIndicator
//! ├── models/         ← RecorderConfig, RecorderError, TransitionError, Session, BarFrame
//! ├── processing/     ← CaptureBuffer, DutyMapper, level and bar-height math
//! ├── engine/         ← CaptureEngine (block chaining), PlaybackScheduler (timer replay)
//! ├── session/        ← DeviceContext (shared atomic state), SessionController
//! └── visualization/  ← VisualizationFeed
//! ```

pub mod engine;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;
pub mod visualization;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use engine::capture::CaptureEngine;
pub use engine::playback::PlaybackScheduler;
pub use models::config::RecorderConfig;
pub use models::error::{RecorderError, TransitionError};
pub use models::sample::{BarFrame, BlockLevels, Sample};
pub use models::state::{Session, StopOutcome};
pub use processing::capture_buffer::CaptureBuffer;
pub use processing::duty::DutyMapper;
pub use session::context::DeviceContext;
pub use session::controller::{Progress, SessionController};
pub use traits::block_transfer::{BlockTransferEngine, CompletionHandler, TransferRequest};
pub use traits::display::Display;
pub use traits::periodic_timer::{PeriodicTimer, TickCallback};
pub use traits::pwm_output::PwmOutput;
pub use traits::sampling::SamplingPeripheral;
pub use traits::status_indicator::StatusIndicator;
pub use visualization::feed::VisualizationFeed;

use std::sync::{Arc, Weak};

use crate::engine::capture::CaptureEngine;
use crate::engine::playback::PlaybackScheduler;
use crate::models::config::RecorderConfig;
use crate::models::error::{RecorderError, TransitionError};
use crate::models::state::{Session, StopOutcome};
use crate::processing::capture_buffer::CaptureBuffer;
use crate::traits::block_transfer::{BlockTransferEngine, CompletionHandler};
use crate::traits::periodic_timer::{PeriodicTimer, TickCallback};
use crate::traits::pwm_output::PwmOutput;
use crate::traits::sampling::SamplingPeripheral;
use crate::traits::status_indicator::StatusIndicator;

use super::context::DeviceContext;

/// Snapshot of the session and its cursors for the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub session: Session,
    pub recorded_samples: usize,
    pub played_samples: usize,
    pub capacity: usize,
    pub recorded_secs: f64,
}

/// Record/playback state machine.
///
/// Owns both engines and guarantees at most one of them runs. The interrupt
/// glue forwards transfer completions to [`on_block_complete`] and timer
/// ticks to [`on_tick`]; the control loop issues the start/stop intents.
///
/// ```text
/// [buttons] → start/stop ─→ SessionController ─┬→ CaptureEngine ──→ CaptureBuffer
///                                              └→ PlaybackScheduler ←──┘
/// ```
///
/// Constructed behind an `Arc` because the completion and tick callbacks
/// handed to the peripherals hold a weak reference back to it.
///
/// [`on_block_complete`]: Self::on_block_complete
/// [`on_tick`]: Self::on_tick
pub struct SessionController<S, D, P, T>
where
    S: SamplingPeripheral,
    D: BlockTransferEngine,
    P: PwmOutput,
    T: PeriodicTimer,
{
    context: Arc<DeviceContext>,
    capture: CaptureEngine<S, D>,
    playback: PlaybackScheduler<P, T>,
}

impl<S, D, P, T> SessionController<S, D, P, T>
where
    S: SamplingPeripheral + 'static,
    D: BlockTransferEngine + 'static,
    P: PwmOutput + 'static,
    T: PeriodicTimer + 'static,
{
    /// Bring up the core around already-initialized peripherals.
    ///
    /// Selects the input channel and silences the output. Session starts idle.
    pub fn new(
        context: DeviceContext,
        sampler: S,
        transfer: D,
        pwm: P,
        timer: T,
    ) -> Result<Arc<Self>, RecorderError> {
        sampler.configure(context.config().input_channel)?;
        if pwm.max_duty() == 0 {
            return Err(RecorderError::PeripheralFault("pwm output has no duty range".into()));
        }
        pwm.set_duty(0);

        let context = Arc::new(context);
        log::info!(
            "Recorder ready: {} Hz, {} samples per block, {} sample window",
            context.config().sample_rate,
            context.buffer().block_size(),
            context.buffer().capacity()
        );

        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let on_complete: CompletionHandler = {
                let weak = weak.clone();
                Arc::new(move |sequence| {
                    if let Some(controller) = weak.upgrade() {
                        controller.on_block_complete(sequence);
                    }
                })
            };
            let on_tick: TickCallback = {
                let weak = weak.clone();
                Arc::new(move || weak.upgrade().map_or(false, |controller| controller.on_tick()))
            };

            Self {
                capture: CaptureEngine::new(sampler, transfer, Arc::clone(&context), on_complete),
                playback: PlaybackScheduler::new(pwm, timer, Arc::clone(&context), on_tick),
                context,
            }
        }))
    }

    /// Convenience constructor building the context from a configuration.
    pub fn with_config(
        config: RecorderConfig,
        status: Arc<dyn StatusIndicator>,
        sampler: S,
        transfer: D,
        pwm: P,
        timer: T,
    ) -> Result<Arc<Self>, RecorderError> {
        Self::new(DeviceContext::new(config, status)?, sampler, transfer, pwm, timer)
    }

    pub fn session(&self) -> Session {
        self.context.session()
    }

    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    pub fn config(&self) -> &RecorderConfig {
        self.context.config()
    }

    pub fn buffer(&self) -> &Arc<CaptureBuffer> {
        self.context.buffer()
    }

    pub fn capture(&self) -> &CaptureEngine<S, D> {
        &self.capture
    }

    pub fn playback(&self) -> &PlaybackScheduler<P, T> {
        &self.playback
    }

    pub fn progress(&self) -> Progress {
        let recorded_samples = self.buffer().write_cursor();
        Progress {
            session: self.session(),
            recorded_samples,
            played_samples: self.playback.read_cursor(),
            capacity: self.buffer().capacity(),
            recorded_secs: recorded_samples as f64 / f64::from(self.config().sample_rate),
        }
    }

    /// Transitions: idle → recording. Discards the previous recording.
    pub fn start_recording(&self) -> Result<(), TransitionError> {
        self.capture.start().map_err(|e| {
            log::warn!("Ignoring start recording: {}", e);
            e
        })
    }

    /// Transitions: recording → idle.
    ///
    /// With [`StopOutcome::Deferred`] a completion handler is mid-flight: no
    /// further block is armed, but the session only reads idle once that
    /// handler returns.
    pub fn stop_recording(&self) -> Result<StopOutcome, TransitionError> {
        if !self.session().is_recording() {
            log::warn!("Ignoring stop recording: not recording");
            return Err(TransitionError::NotActive(Session::Recording));
        }
        Ok(self.capture.stop())
    }

    /// Transitions: idle → playing, only with something recorded.
    pub fn start_playback(&self) -> Result<(), TransitionError> {
        self.playback.start().map_err(|e| {
            log::warn!("Ignoring start playback: {}", e);
            e
        })
    }

    /// Transitions: playing → idle.
    ///
    /// With [`StopOutcome::Deferred`] a tick is mid-flight and ends playback
    /// itself when it returns.
    pub fn stop_playback(&self) -> Result<StopOutcome, TransitionError> {
        if !self.session().is_playing() {
            log::warn!("Ignoring stop playback: not playing");
            return Err(TransitionError::NotActive(Session::Playing));
        }
        Ok(self.playback.stop())
    }

    /// Record button: starts a recording when idle, stops it when recording.
    pub fn toggle_recording(&self) -> Result<(), TransitionError> {
        match self.session() {
            Session::Recording => self.stop_recording().map(|_| ()),
            _ => self.start_recording(),
        }
    }

    /// Play button: starts playback when idle, stops it when playing.
    pub fn toggle_playback(&self) -> Result<(), TransitionError> {
        match self.session() {
            Session::Playing => self.stop_playback().map(|_| ()),
            _ => self.start_playback(),
        }
    }

    /// Forward a transfer-completion interrupt for transfer `sequence`.
    pub fn on_block_complete(&self, sequence: u64) {
        self.capture.on_block_complete(sequence);
    }

    /// Forward a playback timer interrupt. Returns whether to reschedule.
    pub fn on_tick(&self) -> bool {
        self.playback.on_tick()
    }
}

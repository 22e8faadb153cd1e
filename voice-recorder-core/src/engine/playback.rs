use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::error::TransitionError;
use crate::models::state::{Session, StopOutcome};
use crate::processing::duty::DutyMapper;
use crate::session::context::DeviceContext;
use crate::traits::periodic_timer::{PeriodicTimer, TickCallback};
use crate::traits::pwm_output::PwmOutput;

use super::gate::{EventGate, StopAction};

/// Timer-paced replay of the recorded region through the PWM output.
///
/// One sample is emitted per tick. The region played is fixed when playback
/// starts (`end` = the write cursor at that moment); `read_cursor` is only
/// written from the timer context.
pub struct PlaybackScheduler<P: PwmOutput, T: PeriodicTimer> {
    pwm: P,
    timer: T,
    context: Arc<DeviceContext>,
    mapper: DutyMapper,
    gate: EventGate,
    read_cursor: AtomicUsize,
    end: AtomicUsize,
    on_tick: TickCallback,
}

impl<P: PwmOutput, T: PeriodicTimer> PlaybackScheduler<P, T> {
    /// `on_tick` is handed to the timer; it must end up calling
    /// [`on_tick`](Self::on_tick) and return its result.
    pub fn new(pwm: P, timer: T, context: Arc<DeviceContext>, on_tick: TickCallback) -> Self {
        let mapper = DutyMapper::from_config(context.config(), pwm.max_duty());
        Self {
            pwm,
            timer,
            context,
            mapper,
            gate: EventGate::default(),
            read_cursor: AtomicUsize::new(0),
            end: AtomicUsize::new(0),
            on_tick,
        }
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn mapper(&self) -> &DutyMapper {
        &self.mapper
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_open()
    }

    /// Samples emitted so far in the current (or last) playback.
    pub fn read_cursor(&self) -> usize {
        self.read_cursor.load(Ordering::Acquire)
    }

    /// Length of the region being played.
    pub fn end(&self) -> usize {
        self.end.load(Ordering::Acquire)
    }

    /// Start playback. Transitions: idle → playing.
    pub fn start(&self) -> Result<(), TransitionError> {
        let session = self.context.session();
        if !session.is_idle() {
            return Err(TransitionError::Busy(session));
        }
        if self.context.buffer().is_empty() {
            return Err(TransitionError::NothingRecorded);
        }

        self.context
            .transition(Session::Idle, Session::Playing)
            .map_err(TransitionError::Busy)?;
        self.begin()
    }

    /// Second half of [`start`](Self::start), run once the session is claimed.
    fn begin(&self) -> Result<(), TransitionError> {
        // No recording can start while playing, so the cursor is stable now.
        // It may still be zero if an empty recording slipped in before the claim.
        let end = self.context.buffer().write_cursor();
        if end == 0 {
            let _ = self.context.transition(Session::Playing, Session::Idle);
            return Err(TransitionError::NothingRecorded);
        }
        self.read_cursor.store(0, Ordering::Release);
        self.end.store(end, Ordering::Release);

        self.gate.open();
        let interval = self.context.config().tick_interval();
        log::debug!("Arming playback timer every {:?} for {} samples", interval, end);
        self.timer.arm(interval, Arc::clone(&self.on_tick));
        Ok(())
    }

    /// Timer handler. Runs in interrupt context.
    ///
    /// Returns whether the timer should fire again. The tick that emits the
    /// last sample also silences the output and ends playback; any later
    /// tick is a no-op.
    pub fn on_tick(&self) -> bool {
        if !self.gate.enter() {
            return false;
        }

        let position = self.read_cursor.load(Ordering::Relaxed);
        let end = self.end.load(Ordering::Relaxed);
        let sample = if position < end {
            self.context.buffer().get(position)
        } else {
            None
        };

        let Some(sample) = sample else {
            self.halt();
            return false;
        };

        self.pwm.set_duty(self.mapper.map(sample));
        let next = position + 1;
        self.read_cursor.store(next, Ordering::Release);

        if next >= end {
            log::info!("Playback finished after {} samples", next);
            self.halt();
            return false;
        }
        if !self.gate.leave() {
            self.halt();
            return false;
        }
        true
    }

    /// Stop playback. Transitions: playing → idle. Idempotent.
    ///
    /// Returns [`StopOutcome::Deferred`] if a tick is running concurrently; that
    /// tick silences the output and ends playback when it returns.
    pub fn stop(&self) -> StopOutcome {
        match self.gate.request_stop() {
            StopAction::Halt => {
                self.teardown();
                StopOutcome::Stopped
            }
            StopAction::Deferred => {
                log::debug!("Stop deferred to running tick");
                StopOutcome::Deferred
            }
            StopAction::AlreadyIdle => StopOutcome::Stopped,
        }
    }

    fn halt(&self) {
        self.gate.close();
        self.teardown();
    }

    fn teardown(&self) {
        self.timer.disarm();
        self.pwm.set_duty(0);
        let _ = self.context.transition(Session::Playing, Session::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record_samples, test_context, MockPwm, MockTimer, RecordingStatus};

    fn scheduler(samples: &[u16]) -> PlaybackScheduler<MockPwm, MockTimer> {
        let status = Arc::new(RecordingStatus::default());
        let context = test_context(8, 1, 2, status);
        record_samples(&context, samples);
        PlaybackScheduler::new(MockPwm::new(1023), MockTimer::default(), context, Arc::new(|| false))
    }

    #[test]
    fn start_arms_timer_at_sample_period() {
        let playback = scheduler(&[2048; 8]);

        playback.start().unwrap();

        assert_eq!(playback.timer().arms(), vec![std::time::Duration::from_nanos(125_000_000)]);
        assert_eq!(playback.context.session(), Session::Playing);
        assert_eq!(playback.end(), 8);
        assert_eq!(playback.read_cursor(), 0);
    }

    #[test]
    fn plays_every_sample_then_silences_on_last_tick() {
        let playback = scheduler(&[0, 4095, 2048, 1000, 0, 4095, 2048, 1000]);
        playback.start().unwrap();

        for _ in 0..7 {
            assert!(playback.on_tick());
        }
        assert_eq!(playback.context.session(), Session::Playing);

        assert!(!playback.on_tick());
        assert_eq!(playback.read_cursor(), 8);
        assert_eq!(playback.pwm().last_duty(), Some(0));
        assert_eq!(playback.context.session(), Session::Idle);
        assert_eq!(playback.timer().disarms(), 1);

        let expected: Vec<u16> = [0, 4095, 2048, 1000, 0, 4095, 2048, 1000]
            .iter()
            .map(|&s| playback.mapper().map(s))
            .chain(std::iter::once(0))
            .collect();
        assert_eq!(playback.pwm().duties(), expected);
    }

    #[test]
    fn late_tick_after_finish_is_noop() {
        let playback = scheduler(&[100; 8]);
        playback.start().unwrap();
        for _ in 0..8 {
            playback.on_tick();
        }
        let writes = playback.pwm().duties().len();

        assert!(!playback.on_tick());
        assert_eq!(playback.pwm().duties().len(), writes);
        assert_eq!(playback.read_cursor(), 8);
        assert_eq!(playback.timer().disarms(), 1);
    }

    #[test]
    fn start_rejected_without_recording() {
        let playback = scheduler(&[]);

        assert_eq!(playback.start(), Err(TransitionError::NothingRecorded));
        assert!(playback.timer().arms().is_empty());
        assert_eq!(playback.context.session(), Session::Idle);
    }

    #[test]
    fn start_rejected_while_playing() {
        let playback = scheduler(&[100; 4]);
        playback.start().unwrap();
        playback.on_tick();

        assert_eq!(playback.start(), Err(TransitionError::Busy(Session::Playing)));
        assert_eq!(playback.read_cursor(), 1);
        assert_eq!(playback.timer().arms().len(), 1);
    }

    #[test]
    fn stop_silences_and_disarms_once() {
        let playback = scheduler(&[4095; 8]);
        playback.start().unwrap();
        playback.on_tick();

        assert_eq!(playback.stop(), StopOutcome::Stopped);
        assert_eq!(playback.stop(), StopOutcome::Stopped);

        assert_eq!(playback.pwm().last_duty(), Some(0));
        assert_eq!(playback.timer().disarms(), 1);
        assert_eq!(playback.context.session(), Session::Idle);
        assert!(!playback.on_tick());
        assert_eq!(playback.read_cursor(), 1);
    }

    #[test]
    fn replay_restarts_from_beginning() {
        let playback = scheduler(&[100; 4]);
        playback.start().unwrap();
        playback.on_tick();
        playback.stop();

        playback.start().unwrap();
        assert_eq!(playback.read_cursor(), 0);
        assert_eq!(playback.end(), 4);
        for _ in 0..3 {
            assert!(playback.on_tick());
        }
        assert!(!playback.on_tick());
    }

    #[test]
    fn duty_never_exceeds_max() {
        let samples: Vec<u16> = (0..8).map(|i| i * 9000).collect();
        let playback = scheduler(&samples);
        playback.start().unwrap();
        while playback.on_tick() {}

        assert!(playback.pwm().duties().iter().all(|&d| d <= 1023));
    }

    #[test]
    fn empty_buffer_after_claim_backs_out() {
        let playback = scheduler(&[]);
        playback.context.transition(Session::Idle, Session::Playing).unwrap();

        assert_eq!(playback.begin(), Err(TransitionError::NothingRecorded));
        assert_eq!(playback.context.session(), Session::Idle);
        assert!(playback.timer().arms().is_empty());
        assert!(!playback.is_active());
    }

    #[test]
    fn stop_during_tick_is_deferred_to_it() {
        let playback = scheduler(&[4095; 8]);
        playback.start().unwrap();

        assert!(playback.gate.enter());
        assert_eq!(playback.stop(), StopOutcome::Deferred);
        assert_eq!(playback.context.session(), Session::Playing);

        assert!(!playback.gate.leave());
        playback.halt();
        assert_eq!(playback.context.session(), Session::Idle);
        assert_eq!(playback.pwm().last_duty(), Some(0));
        assert!(!playback.on_tick());
    }

    #[test]
    fn stale_tick_after_restart_plays_from_start() {
        let playback = scheduler(&[100, 200, 300, 400]);
        playback.start().unwrap();
        playback.on_tick();
        playback.on_tick();
        playback.stop();
        assert!(!playback.on_tick());

        playback.start().unwrap();
        assert!(playback.on_tick());
        assert_eq!(playback.read_cursor(), 1);
        assert_eq!(playback.pwm().last_duty(), Some(playback.mapper().map(100)));
    }
}

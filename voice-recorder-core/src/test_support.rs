//! Mock collaborators recording every call, for driving the core by hand.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::sample::{BarFrame, Sample};
use crate::models::state::Session;
use crate::session::context::DeviceContext;
use crate::traits::block_transfer::{BlockTransferEngine, TransferRequest};
use crate::traits::display::Display;
use crate::traits::periodic_timer::{PeriodicTimer, TickCallback};
use crate::traits::pwm_output::PwmOutput;
use crate::traits::sampling::SamplingPeripheral;
use crate::traits::status_indicator::StatusIndicator;

pub(crate) fn test_context(
    sample_rate: u32,
    record_secs: u32,
    blocks_per_second: u32,
    status: Arc<RecordingStatus>,
) -> Arc<DeviceContext> {
    let config = RecorderConfig {
        sample_rate,
        record_secs,
        blocks_per_second,
        ..RecorderConfig::default()
    };
    Arc::new(DeviceContext::new(config, status).unwrap())
}

/// Store `samples` from the start of the buffer and commit the blocks
/// covering them.
pub(crate) fn record_samples(context: &DeviceContext, samples: &[Sample]) {
    let buffer = context.buffer();
    buffer.reset();
    for (i, &sample) in samples.iter().enumerate() {
        buffer.store(i, sample);
    }
    let blocks = (samples.len() + buffer.block_size() - 1) / buffer.block_size();
    for _ in 0..blocks {
        buffer.commit_block();
    }
}

#[derive(Default)]
pub(crate) struct RecordingStatus {
    states: Mutex<Vec<Session>>,
}

impl RecordingStatus {
    pub(crate) fn states(&self) -> Vec<Session> {
        self.states.lock().clone()
    }
}

impl StatusIndicator for RecordingStatus {
    fn set_state(&self, session: Session) {
        self.states.lock().push(session);
    }
}

#[derive(Default)]
pub(crate) struct MockAdc {
    faulty: bool,
    channel: Mutex<Option<u8>>,
    enables: Mutex<Vec<bool>>,
    drains: Mutex<usize>,
}

impl MockAdc {
    pub(crate) fn faulty() -> Self {
        Self {
            faulty: true,
            ..Self::default()
        }
    }

    pub(crate) fn channel(&self) -> Option<u8> {
        *self.channel.lock()
    }

    pub(crate) fn enables(&self) -> Vec<bool> {
        self.enables.lock().clone()
    }

    pub(crate) fn drains(&self) -> usize {
        *self.drains.lock()
    }
}

impl SamplingPeripheral for MockAdc {
    fn configure(&self, channel: u8) -> Result<(), RecorderError> {
        if self.faulty {
            return Err(RecorderError::PeripheralUnavailable("adc".into()));
        }
        *self.channel.lock() = Some(channel);
        Ok(())
    }

    fn enable(&self, on: bool) {
        self.enables.lock().push(on);
    }

    fn drain_stale(&self) {
        *self.drains.lock() += 1;
    }
}

#[derive(Default)]
pub(crate) struct MockDma {
    requests: Mutex<Vec<TransferRequest>>,
    aborts: Mutex<usize>,
}

impl MockDma {
    /// `(offset, count)` of every armed transfer.
    pub(crate) fn arms(&self) -> Vec<(usize, usize)> {
        self.requests.lock().iter().map(|r| (r.offset, r.count)).collect()
    }

    pub(crate) fn aborts(&self) -> usize {
        *self.aborts.lock()
    }

    /// Write `value` into every slot of the last armed transfer.
    pub(crate) fn fill_last(&self, value: Sample) {
        let request = self.requests.lock().last().cloned();
        if let Some(request) = request {
            for i in request.offset..request.offset + request.count {
                request.destination.store(i, value);
            }
        }
    }

    /// Sequence number of the last armed transfer.
    pub(crate) fn last_sequence(&self) -> Option<u64> {
        self.requests.lock().last().map(|r| r.sequence)
    }

    /// Deliver the completion event of the last armed transfer.
    pub(crate) fn fire(&self) {
        let request = self.requests.lock().last().map(|r| (Arc::clone(&r.on_complete), r.sequence));
        if let Some((handler, sequence)) = request {
            handler(sequence);
        }
    }
}

impl BlockTransferEngine for MockDma {
    fn arm(&self, request: TransferRequest) {
        self.requests.lock().push(request);
    }

    fn abort(&self) {
        *self.aborts.lock() += 1;
    }

    fn is_busy(&self) -> bool {
        false
    }
}

pub(crate) struct MockPwm {
    max_duty: u16,
    duties: Mutex<Vec<u16>>,
}

impl MockPwm {
    pub(crate) fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            duties: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn duties(&self) -> Vec<u16> {
        self.duties.lock().clone()
    }

    pub(crate) fn last_duty(&self) -> Option<u16> {
        self.duties.lock().last().copied()
    }
}

impl PwmOutput for MockPwm {
    fn set_duty(&self, level: u16) {
        self.duties.lock().push(level);
    }

    fn max_duty(&self) -> u16 {
        self.max_duty
    }
}

#[derive(Default)]
pub(crate) struct MockTimer {
    arms: Mutex<Vec<Duration>>,
    disarms: Mutex<usize>,
    callback: Mutex<Option<TickCallback>>,
}

impl MockTimer {
    pub(crate) fn arms(&self) -> Vec<Duration> {
        self.arms.lock().clone()
    }

    pub(crate) fn disarms(&self) -> usize {
        *self.disarms.lock()
    }

    /// Invoke the armed callback once, as the timer interrupt would.
    pub(crate) fn fire(&self) -> bool {
        let callback = self.callback.lock().clone();
        callback.map_or(false, |cb| cb())
    }
}

impl PeriodicTimer for MockTimer {
    fn arm(&self, interval: Duration, callback: TickCallback) {
        self.arms.lock().push(interval);
        *self.callback.lock() = Some(callback);
    }

    fn disarm(&self) {
        *self.disarms.lock() += 1;
    }
}

#[derive(Default)]
pub(crate) struct MockDisplay {
    pub(crate) frames: Vec<BarFrame>,
}

impl Display for MockDisplay {
    fn render(&mut self, frame: &BarFrame) {
        self.frames.push(frame.clone());
    }
}

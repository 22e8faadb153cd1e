//! Simulated ADC with a free-running FIFO.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use voice_recorder_core::{RecorderError, Sample, SamplingPeripheral};

use crate::signal::Signal;

/// Highest input channel on the reference part (GPIO26–29).
pub const MAX_CHANNEL: u8 = 3;

struct AdcState {
    signal: Mutex<Signal>,
    sample_rate: u32,
    bits: u8,
    channel: Mutex<Option<u8>>,
    running: AtomicBool,
    conversions: AtomicU64,
    drains: AtomicUsize,
}

/// Simulated converter sampling a [`Signal`].
///
/// Cheap to clone; clones share the same converter, so the board can hand
/// one to the capture engine and another to the DMA.
#[derive(Clone)]
pub struct SimAdc {
    state: Arc<AdcState>,
}

impl SimAdc {
    pub fn new(signal: Signal, sample_rate: u32, bits: u8) -> Self {
        Self {
            state: Arc::new(AdcState {
                signal: Mutex::new(signal),
                sample_rate,
                bits,
                channel: Mutex::new(None),
                running: AtomicBool::new(false),
                conversions: AtomicU64::new(0),
                drains: AtomicUsize::new(0),
            }),
        }
    }

    /// Swap the input signal, e.g. to speak into the microphone mid-recording.
    pub fn set_signal(&self, signal: Signal) {
        *self.state.signal.lock() = signal;
    }

    pub fn sample_rate(&self) -> u32 {
        self.state.sample_rate
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn channel(&self) -> Option<u8> {
        *self.state.channel.lock()
    }

    pub fn drains(&self) -> usize {
        self.state.drains.load(Ordering::SeqCst)
    }

    /// Pop the next conversion from the FIFO. `None` while the converter is
    /// stopped (no data request is raised).
    pub fn pop(&self) -> Option<Sample> {
        if !self.is_running() {
            return None;
        }
        let index = self.state.conversions.fetch_add(1, Ordering::SeqCst);
        let signal = *self.state.signal.lock();
        Some(signal.sample_at(index, self.state.sample_rate, self.state.bits))
    }
}

impl SamplingPeripheral for SimAdc {
    fn configure(&self, channel: u8) -> Result<(), RecorderError> {
        if channel > MAX_CHANNEL {
            return Err(RecorderError::PeripheralUnavailable(format!(
                "adc channel {} out of range 0..={}",
                channel, MAX_CHANNEL
            )));
        }
        *self.state.channel.lock() = Some(channel);
        log::debug!("ADC input {} selected", channel);
        Ok(())
    }

    fn enable(&self, on: bool) {
        self.state.running.store(on, Ordering::SeqCst);
    }

    fn drain_stale(&self) {
        self.state.drains.fetch_add(1, Ordering::SeqCst);
    }
}

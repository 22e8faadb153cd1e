use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::error::TransitionError;
use crate::models::state::{Session, StopOutcome};
use crate::session::context::DeviceContext;
use crate::traits::block_transfer::{BlockTransferEngine, CompletionHandler, TransferRequest};
use crate::traits::sampling::SamplingPeripheral;

use super::gate::{EventGate, StopAction};

/// Sequence value meaning "no transfer in flight".
const NO_TRANSFER: u64 = 0;

/// Block-chained capture from the converter into the [`CaptureBuffer`].
///
/// Data flow:
/// ```text
/// [ADC FIFO] ─DREQ→ [DMA block @ write_cursor] ─IRQ→ on_block_complete(seq)
///                          ↑                               │
///                          └──── re-arm at new cursor ─────┘  (until full)
/// ```
///
/// Every armed transfer gets a fresh sequence number. A completion is only
/// credited if it carries the sequence of the transfer currently in flight.
///
/// [`CaptureBuffer`]: crate::processing::capture_buffer::CaptureBuffer
pub struct CaptureEngine<S: SamplingPeripheral, D: BlockTransferEngine> {
    sampler: S,
    transfer: D,
    context: Arc<DeviceContext>,
    gate: EventGate,
    next_sequence: AtomicU64,
    in_flight: AtomicU64,
    on_complete: CompletionHandler,
}

impl<S: SamplingPeripheral, D: BlockTransferEngine> CaptureEngine<S, D> {
    /// `on_complete` is handed to every armed transfer; it must end up
    /// calling [`on_block_complete`](Self::on_block_complete) with the
    /// sequence it receives.
    pub fn new(sampler: S, transfer: D, context: Arc<DeviceContext>, on_complete: CompletionHandler) -> Self {
        Self {
            sampler,
            transfer,
            context,
            gate: EventGate::default(),
            next_sequence: AtomicU64::new(NO_TRANSFER),
            in_flight: AtomicU64::new(NO_TRANSFER),
            on_complete,
        }
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn transfer(&self) -> &D {
        &self.transfer
    }

    /// Whether a transfer chain is currently running.
    pub fn is_active(&self) -> bool {
        self.gate.is_open()
    }

    /// Start a recording. Transitions: idle → recording.
    ///
    /// Discards the previous recording.
    pub fn start(&self) -> Result<(), TransitionError> {
        self.context
            .transition(Session::Idle, Session::Recording)
            .map_err(TransitionError::Busy)?;

        // The session claim above makes this engine the buffer's only writer.
        self.context.buffer().reset();

        self.sampler.enable(false);
        self.sampler.drain_stale();

        self.gate.open();
        self.arm_block(0);
        self.sampler.enable(true);
        Ok(())
    }

    /// Transfer-completion handler. Runs in interrupt context.
    ///
    /// `sequence` identifies the transfer that finished. Duplicate, stale or
    /// late completions (an older sequence, after a stop, or with no
    /// recording running) are ignored.
    pub fn on_block_complete(&self, sequence: u64) {
        if !self.gate.enter() {
            log::trace!("Ignoring spurious block completion");
            return;
        }

        let claimed = sequence != NO_TRANSFER
            && self
                .in_flight
                .compare_exchange(sequence, NO_TRANSFER, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
        if !claimed {
            log::trace!(
                "Ignoring completion of transfer {} (in flight: {})",
                sequence,
                self.in_flight.load(Ordering::Acquire)
            );
            if !self.gate.leave() {
                self.halt();
            }
            return;
        }

        let buffer = self.context.buffer();
        match buffer.commit_block() {
            Some(cursor) if cursor < buffer.capacity() => {
                self.arm_block(cursor);
                if !self.gate.leave() {
                    self.halt();
                }
            }
            Some(_) => {
                log::info!("Capture window full ({} samples)", buffer.capacity());
                self.halt();
            }
            None => self.halt(),
        }
    }

    /// Stop recording. Transitions: recording → idle. Idempotent.
    ///
    /// If a completion handler is running concurrently it finishes the
    /// teardown itself and arms nothing further; the result is then
    /// [`StopOutcome::Deferred`].
    pub fn stop(&self) -> StopOutcome {
        match self.gate.request_stop() {
            StopAction::Halt => {
                self.teardown();
                StopOutcome::Stopped
            }
            StopAction::Deferred => {
                log::debug!("Stop deferred to running completion handler");
                StopOutcome::Deferred
            }
            StopAction::AlreadyIdle => StopOutcome::Stopped,
        }
    }

    fn arm_block(&self, offset: usize) {
        let buffer = self.context.buffer();
        let count = buffer.block_size().min(buffer.capacity() - offset);
        let sequence = self.next_sequence.fetch_add(1, Ordering::AcqRel) + 1;
        // Published before arming so an immediate completion is recognized.
        self.in_flight.store(sequence, Ordering::Release);
        log::debug!("Arming block transfer {} at {} ({} samples)", sequence, offset, count);
        self.transfer.arm(TransferRequest {
            source: self.context.config().input_channel,
            destination: Arc::clone(buffer),
            offset,
            count,
            trigger_on_request: true,
            sequence,
            on_complete: Arc::clone(&self.on_complete),
        });
    }

    fn halt(&self) {
        self.gate.close();
        self.teardown();
    }

    fn teardown(&self) {
        self.transfer.abort();
        self.in_flight.store(NO_TRANSFER, Ordering::Release);
        self.sampler.enable(false);
        // Fails only if the session already left recording, e.g. a racing stop.
        let _ = self.context.transition(Session::Recording, Session::Idle);
    }
}

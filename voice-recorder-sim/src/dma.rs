//! Simulated DMA channel paced by the ADC's data requests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use voice_recorder_core::{BlockTransferEngine, TransferRequest};

use crate::adc::SimAdc;
use crate::clock::SimClock;

/// Poll interval while the converter raises no data request.
const DREQ_POLL: Duration = Duration::from_millis(1);

struct DmaState {
    busy: AtomicBool,
    generation: AtomicU64,
}

/// Simulated DMA channel.
///
/// Each armed transfer runs on its own `sim-dma` thread: it waits one block
/// of device time, pulls `count` conversions from the ADC into the
/// destination, then delivers the completion (the "IRQ") on that thread.
/// Aborting bumps a generation counter so the stale thread exits without
/// completing, then joins it.
pub struct SimDma {
    adc: SimAdc,
    clock: SimClock,
    state: Arc<DmaState>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl SimDma {
    pub fn new(adc: SimAdc, clock: SimClock) -> Self {
        Self {
            adc,
            clock,
            state: Arc::new(DmaState {
                busy: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Whether any transfer thread is still alive.
    pub fn is_running(&self) -> bool {
        self.workers.lock().iter().any(|h| !h.is_finished())
    }

    /// Join every worker except the calling one, which is left to be reaped
    /// by a later call.
    fn join_workers(&self) {
        let me = thread::current().id();
        let (own, others): (Vec<_>, Vec<_>) = std::mem::take(&mut *self.workers.lock())
            .into_iter()
            .partition(|h| h.thread().id() == me);
        self.workers.lock().extend(own);
        for handle in others {
            if handle.join().is_err() {
                log::error!("DMA thread panicked");
            }
        }
    }

    fn reap_finished(&self) {
        let mut workers = self.workers.lock();
        let (finished, running): (Vec<_>, Vec<_>) =
            std::mem::take(&mut *workers).into_iter().partition(|h| h.is_finished());
        *workers = running;
        drop(workers);
        for handle in finished {
            let _ = handle.join();
        }
    }
}

impl BlockTransferEngine for SimDma {
    fn arm(&self, request: TransferRequest) {
        if self.state.busy.swap(true, Ordering::SeqCst) {
            log::warn!("DMA re-armed while busy; previous transfer dropped");
        }
        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = Arc::clone(&self.state);
        let adc = self.adc.clone();
        let wait = self.clock.samples(request.count, adc.sample_rate());

        self.reap_finished();
        let spawned = thread::Builder::new()
            .name("sim-dma".into())
            .spawn(move || run_transfer(state, adc, request, generation, wait));
        match spawned {
            Ok(handle) => self.workers.lock().push(handle),
            Err(e) => {
                log::error!("Failed to spawn DMA thread: {}", e);
                self.state.busy.store(false, Ordering::SeqCst);
            }
        }
    }

    fn abort(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.state.busy.store(false, Ordering::SeqCst);
        self.join_workers();
    }

    fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::SeqCst)
    }
}

impl Drop for SimDma {
    fn drop(&mut self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.join_workers();
    }
}

fn run_transfer(state: Arc<DmaState>, adc: SimAdc, request: TransferRequest, generation: u64, wait: Duration) {
    let current = || state.generation.load(Ordering::SeqCst) == generation;

    // Block period, sliced so an abort is noticed promptly.
    let deadline = Instant::now() + wait;
    loop {
        if !current() {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(DREQ_POLL));
    }

    let mut moved = 0;
    while moved < request.count {
        if !current() {
            return;
        }
        match adc.pop() {
            Some(sample) => {
                request.destination.store(request.offset + moved, sample);
                moved += 1;
            }
            // Unpaced transfers don't wait for the converter; the slot keeps
            // whatever it held.
            None if !request.trigger_on_request => moved += 1,
            None => thread::sleep(DREQ_POLL),
        }
    }

    // An abort landing after this check is caught by the sequence check in
    // the completion handler.
    if !current() {
        return;
    }
    state.busy.store(false, Ordering::SeqCst);
    (request.on_complete)(request.sequence);
}

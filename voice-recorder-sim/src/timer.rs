//! Simulated repeating alarm.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use voice_recorder_core::{PeriodicTimer, TickCallback};

use crate::clock::SimClock;

/// Simulated periodic timer.
///
/// Each `arm` starts a `sim-timer` thread that sleeps to fixed deadlines
/// (no drift accumulation) and invokes the callback until it returns
/// `false` or the timer is disarmed.
pub struct SimTimer {
    clock: SimClock,
    generation: Arc<AtomicU64>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SimTimer {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            generation: Arc::new(AtomicU64::new(0)),
            handle: Mutex::new(None),
        }
    }

    /// Whether a schedule thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.lock().as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl PeriodicTimer for SimTimer {
    fn arm(&self, interval: Duration, callback: TickCallback) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let period = self.clock.scale(interval).max(Duration::from_nanos(1));

        let spawned = thread::Builder::new().name("sim-timer".into()).spawn(move || {
            let mut deadline = Instant::now();
            loop {
                deadline += period;
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                }
                if current.load(Ordering::SeqCst) != generation || !callback() {
                    break;
                }
            }
        });

        match spawned {
            Ok(handle) => {
                // The previous schedule was cancelled by the generation bump.
                let previous = self.handle.lock().replace(handle);
                if let Some(previous) = previous {
                    let _ = previous.join();
                }
            }
            Err(e) => log::error!("Failed to spawn timer thread: {}", e),
        }
    }

    fn disarm(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for SimTimer {
    fn drop(&mut self) {
        self.disarm();
        if let Some(handle) = self.handle.get_mut().take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

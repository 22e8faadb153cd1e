use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const HANDLING: u8 = 2;
const STOP_REQUESTED: u8 = 3;

/// What a caller of [`EventGate::request_stop`] has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopAction {
    /// The gate was armed and is now closed; the caller tears down.
    Halt,
    /// A handler is running; it will tear down when it leaves.
    Deferred,
    /// Nothing was armed.
    AlreadyIdle,
}

/// Admission control between an interrupt handler and the control loop.
///
/// ```text
///  open()         enter()            leave()
/// IDLE ──→ ARMED ────────→ HANDLING ────────→ ARMED
///            │                 │
///   request_stop()      request_stop()
///            ↓                 ↓
///          IDLE          STOP_REQUESTED ── leave() fails → handler halts
/// ```
///
/// Handlers only touch shared state between a successful `enter()` and the
/// matching `leave()`/`close()`, so a closed gate turns late or duplicate
/// events into no-ops.
#[derive(Debug, Default)]
pub(crate) struct EventGate(AtomicU8);

impl EventGate {
    pub(crate) fn open(&self) {
        self.0.store(ARMED, Ordering::Release);
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire) != IDLE
    }

    /// Claim the gate for one event. `false` means the event is spurious.
    pub(crate) fn enter(&self) -> bool {
        self.0
            .compare_exchange(ARMED, HANDLING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Hand the gate back after an event. `false` means a stop arrived while
    /// handling and the handler must halt.
    pub(crate) fn leave(&self) -> bool {
        self.0
            .compare_exchange(HANDLING, ARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn close(&self) {
        self.0.store(IDLE, Ordering::Release);
    }

    pub(crate) fn request_stop(&self) -> StopAction {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            let (next, action) = match current {
                ARMED => (IDLE, StopAction::Halt),
                HANDLING => (STOP_REQUESTED, StopAction::Deferred),
                STOP_REQUESTED => return StopAction::Deferred,
                _ => return StopAction::AlreadyIdle,
            };
            match self
                .0
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return action,
                Err(observed) => current = observed,
            }
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

/// Invoked from the timer interrupt on each period.
///
/// Returns `true` to keep the timer running, `false` to stop it.
pub type TickCallback = Arc<dyn Fn() -> bool + Send + Sync + 'static>;

/// Repeating hardware alarm used to pace playback.
pub trait PeriodicTimer: Send + Sync {
    /// Fire `callback` every `interval` until it returns `false` or the timer
    /// is disarmed. Re-arming replaces any previous schedule.
    fn arm(&self, interval: Duration, callback: TickCallback);

    /// Cancel the schedule. Safe to call from within the callback.
    fn disarm(&self);
}

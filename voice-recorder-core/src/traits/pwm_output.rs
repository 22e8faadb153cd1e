/// Pulse-width output driving the buzzer.
pub trait PwmOutput: Send + Sync {
    /// Set the active portion of each cycle, `0..=max_duty()`.
    fn set_duty(&self, level: u16);

    /// Counter wrap value; a duty of `max_duty()` is fully on.
    fn max_duty(&self) -> u16;
}

use crate::models::error::RecorderError;

/// The analog-to-digital converter feeding the capture engine.
///
/// Implemented by:
/// - `SimAdc` (host simulation)
/// - Future: an RP2040 ADC FIFO wrapper
pub trait SamplingPeripheral: Send + Sync {
    /// Select the input channel. Called once during bring-up.
    fn configure(&self, channel: u8) -> Result<(), RecorderError>;

    /// Start or stop free-running conversions into the FIFO.
    fn enable(&self, on: bool);

    /// Discard any conversions still sitting in the FIFO.
    fn drain_stale(&self);
}

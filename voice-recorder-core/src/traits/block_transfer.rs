use std::fmt;
use std::sync::Arc;

use crate::processing::capture_buffer::CaptureBuffer;

/// Invoked from the transfer-completion interrupt once a block has landed,
/// with the [`sequence`](TransferRequest::sequence) of that transfer.
///
/// Runs in interrupt context: it must not block.
pub type CompletionHandler = Arc<dyn Fn(u64) + Send + Sync + 'static>;

/// One peripheral-to-memory block transfer.
#[derive(Clone)]
pub struct TransferRequest {
    /// Converter channel the samples are read from.
    pub source: u8,

    /// Buffer receiving the samples.
    pub destination: Arc<CaptureBuffer>,

    /// First sample slot written in `destination`.
    pub offset: usize,

    /// Number of samples to move.
    pub count: usize,

    /// Pace the transfer on the converter's data request line.
    pub trigger_on_request: bool,

    /// Identifies this transfer; passed back unchanged to `on_complete`.
    pub sequence: u64,

    /// Delivered once after the last sample of this block is stored.
    pub on_complete: CompletionHandler,
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("source", &self.source)
            .field("offset", &self.offset)
            .field("count", &self.count)
            .field("trigger_on_request", &self.trigger_on_request)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// DMA channel moving converter output into the capture buffer.
pub trait BlockTransferEngine: Send + Sync {
    /// Start a transfer. A previously armed transfer must have completed or
    /// been aborted.
    fn arm(&self, request: TransferRequest);

    /// Cancel the in-flight transfer. Its completion is never delivered.
    fn abort(&self);

    fn is_busy(&self) -> bool;
}

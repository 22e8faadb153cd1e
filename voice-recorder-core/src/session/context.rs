use std::fmt;
use std::sync::Arc;

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::state::{AtomicSession, Session};
use crate::processing::capture_buffer::CaptureBuffer;
use crate::traits::status_indicator::StatusIndicator;

/// State shared by the control loop and both interrupt handlers.
///
/// Every field that more than one context touches is atomic: the session
/// cell, and the cursors and counters inside [`CaptureBuffer`]. The
/// configuration is immutable after construction.
pub struct DeviceContext {
    config: RecorderConfig,
    buffer: Arc<CaptureBuffer>,
    session: AtomicSession,
    status: Arc<dyn StatusIndicator>,
}

impl DeviceContext {
    pub fn new(config: RecorderConfig, status: Arc<dyn StatusIndicator>) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::InvalidConfig)?;
        let buffer = Arc::new(CaptureBuffer::new(config.capacity(), config.block_size()));
        status.set_state(Session::Idle);
        Ok(Self {
            config,
            buffer,
            session: AtomicSession::default(),
            status,
        })
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn buffer(&self) -> &Arc<CaptureBuffer> {
        &self.buffer
    }

    pub fn session(&self) -> Session {
        self.session.load()
    }

    /// Atomically move the session from `from` to `to` and update the status
    /// indicator. Returns the session actually observed on failure.
    pub(crate) fn transition(&self, from: Session, to: Session) -> Result<(), Session> {
        self.session.transition(from, to)?;
        log::info!("Session {} -> {}", from, to);
        self.status.set_state(to);
        Ok(())
    }
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

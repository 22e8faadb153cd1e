use thiserror::Error;

use super::state::Session;

/// Errors raised while configuring or bringing up the recorder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("peripheral unavailable: {0}")]
    PeripheralUnavailable(String),

    #[error("peripheral fault: {0}")]
    PeripheralFault(String),
}

/// A start/stop intent that was ignored.
///
/// Rejections leave every engine untouched. The control loop is expected to
/// log them and carry on; none of them is fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("session busy ({0})")]
    Busy(Session),

    #[error("nothing recorded yet")]
    NothingRecorded,

    #[error("not {0}")]
    NotActive(Session),
}

use crate::models::state::Session;

/// Status LED (or any other indicator) mirroring the session.
///
/// Called on every session transition, including automatic stops raised from
/// interrupt context. Implementations must not block.
pub trait StatusIndicator: Send + Sync {
    fn set_state(&self, session: Session);
}

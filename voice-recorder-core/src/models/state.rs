use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Current activity of the device.
///
/// State transitions:
/// ```text
///          start_recording            start_playback (write_cursor > 0)
///   Idle ──────────────────→ Recording    Idle ─────────────────→ Playing
///    ↑                          │          ↑                        │
///    └── buffer full / stop ────┘          └── exhausted / stop ────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Idle,
    Recording,
    Playing,
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Recording => 1,
            Self::Playing => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Recording,
            2 => Self::Playing,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// How a stop request was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The engine is torn down and the session is idle.
    Stopped,
    /// An interrupt handler was running. It performs the teardown itself when
    /// it returns, so the session is still active until then. Nothing new is
    /// armed either way.
    Deferred,
}

/// Lock-free cell holding the current [`Session`].
///
/// Every transition is a single compare-and-swap, so a start intent racing an
/// automatic stop either wins cleanly or observes the other side's result.
#[derive(Debug)]
pub struct AtomicSession(AtomicU8);

impl AtomicSession {
    pub fn new(session: Session) -> Self {
        Self(AtomicU8::new(session.as_u8()))
    }

    pub fn load(&self) -> Session {
        Session::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`. Returns the observed session on failure.
    pub fn transition(&self, from: Session, to: Session) -> Result<(), Session> {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Session::from_u8)
    }
}

impl Default for AtomicSession {
    fn default() -> Self {
        Self::new(Session::Idle)
    }
}

//! Session lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a session
///
/// `Stopped` only lasts for the teardown grace window; the engine returns to
/// `Idle` on its own once the voices have faded out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session running (default state)
    #[default]
    Idle,
    /// Voices are sounding and the timer is running
    Playing,
    /// Voices are paused, elapsed time is frozen
    Paused,
    /// Voices are fading out, teardown pending
    Stopped,
}

impl SessionState {
    /// Whether `stop()` is legal from this state
    pub fn can_stop(&self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}

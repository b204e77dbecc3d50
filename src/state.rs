//! Session lifecycle state.
//!
//! A session moves strictly forward:
//!
//! ```text
//! idle -> connecting -> connected -> closing -> closed
//!              \___________________________/
//!                     (dial failure)
//! ```
//!
//! Once `closed`, nothing else happens; a new session needs a new client.

use std::fmt;

/// Where a session is in its lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    /// Not started.
    #[default]
    Idle,
    /// Dialling and authenticating.
    Connecting,
    /// Pipeline running.
    Connected,
    /// Shutting the pipeline down.
    Closing,
    /// Finished. Terminal.
    Closed,
}

impl SessionState {
    /// Whether `self -> next` is an allowed transition.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Connected)
                | (Connecting, Closed)
                | (Connected, Closing)
                | (Closing, Closed)
        )
    }

    /// True once the session has finished.
    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }

    /// True while commands can be queued.
    pub fn is_running(self) -> bool {
        self == SessionState::Connected
    }

    /// Lower-case name, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

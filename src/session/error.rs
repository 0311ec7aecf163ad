use std::fmt;

use crate::timing::ClockError;

/// Errors surfaced by a [`GameSession`](super::GameSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The transport was misused (ticked before start).
    Clock(ClockError),
    /// The scene has no drum targets at all; nothing can be spawned.
    SceneUnavailable,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Clock(e) => write!(f, "clock error: {e}"),
            SessionError::SceneUnavailable => write!(f, "scene has no drum targets"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Clock(e) => Some(e),
            SessionError::SceneUnavailable => None,
        }
    }
}

impl From<ClockError> for SessionError {
    fn from(e: ClockError) -> Self {
        SessionError::Clock(e)
    }
}

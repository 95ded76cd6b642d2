//! Session manager messages
//!
//! Commands and responses for the actor pattern.

use pokercore::{Action, Rejection, Session, Tally, Transition};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Channel error")]
    ChannelError,
}

impl SessionError {
    /// The rejection, if the session refused the operation
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            Self::ChannelError => None,
        }
    }
}

/// Response from session operations
pub type SessionResponse<T> = Result<T, SessionError>;

/// Commands sent to the SessionManager actor
#[derive(Debug)]
pub enum SessionCommand {
    // Transitions
    Apply {
        caller_id: String,
        action: Action,
        reply: oneshot::Sender<Transition>,
    },

    // Reads
    Snapshot {
        reply: oneshot::Sender<Session>,
    },
    Results {
        reply: oneshot::Sender<Option<Tally>>,
    },

    // Shutdown
    Shutdown,
}

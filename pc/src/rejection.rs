//! Why a session transition was refused
//!
//! A rejection is an ordinary value: the session is left exactly as it was
//! and the caller decides whether to report it.

use thiserror::Error;

/// Reasons a session operation did not apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("No such session")]
    NoSession,

    #[error("There is no current task")]
    NoCurrentTask,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Votes are already revealed for this round")]
    AlreadyRevealed,

    #[error("Votes have not been revealed yet")]
    NotRevealed,

    #[error("Invalid vote value: {0} (expected one of 1, 2, 3, 5, 8, 13, 21)")]
    InvalidVoteValue(String),

    #[error("Empty {0}")]
    EmptyInput(&'static str),

    #[error("Another participant is already the facilitator")]
    FacilitatorAlreadyClaimed,

    #[error("Only the facilitator can do that")]
    NotFacilitator,
}

impl Rejection {
    /// Short machine-friendly name, used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::NoCurrentTask => "no_current_task",
            Self::TaskNotFound(_) => "task_not_found",
            Self::AlreadyRevealed => "already_revealed",
            Self::NotRevealed => "not_revealed",
            Self::InvalidVoteValue(_) => "invalid_vote_value",
            Self::EmptyInput(_) => "empty_input",
            Self::FacilitatorAlreadyClaimed => "facilitator_already_claimed",
            Self::NotFacilitator => "not_facilitator",
        }
    }
}

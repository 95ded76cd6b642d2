//! Task domain type
//!
//! A task is one item being estimated. The session keeps a history copy of
//! every task plus a separate live copy for the round in progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vote::{Vote, VoteValue};
use crate::id::new_task_id;

/// A task under estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Votes cast this round, in casting order, at most one per user
    #[serde(default)]
    pub votes: Vec<Vote>,

    /// Whether the votes are visible
    #[serde(default)]
    pub revealed: bool,

    /// Estimate the team settled on, if any
    #[serde(default)]
    pub final_estimate: Option<VoteValue>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with a generated ID
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let id = new_task_id(&title);
        Self::with_id(id, title)
    }

    /// Create a task with a specific ID (useful for tests)
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            votes: Vec::new(),
            revealed: false,
            final_estimate: None,
            created_at: Utc::now(),
        }
    }

    /// Copy of this task ready for a fresh round: no votes, hidden
    pub fn fresh_round(&self) -> Self {
        debug!(task_id = %self.id, "fresh_round: called");
        Self {
            votes: Vec::new(),
            revealed: false,
            ..self.clone()
        }
    }

    /// Record a vote, replacing any earlier vote by the same user
    ///
    /// The replacement moves to the end, so `votes` stays in casting order.
    pub fn cast(&mut self, user_id: &str, value: VoteValue) {
        self.votes.retain(|v| v.user_id != user_id);
        self.votes.push(Vote::new(user_id, value));
    }

    /// The vote a user has cast this round
    pub fn vote_of(&self, user_id: &str) -> Option<VoteValue> {
        self.votes.iter().find(|v| v.user_id == user_id).map(|v| v.value)
    }

    /// Whether the user has voted this round
    pub fn has_voted(&self, user_id: &str) -> bool {
        self.vote_of(user_id).is_some()
    }

    /// Points of every vote, in casting order
    pub fn points(&self) -> Vec<u32> {
        self.votes.iter().map(|v| v.value.points()).collect()
    }
}

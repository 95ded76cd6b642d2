//! Session and Participant domain types

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Someone who joined the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Complete state of one estimation session
///
/// `current_task` is held by value. Once a round is under way it diverges
/// from its entry in `tasks`, which keeps the creation-time snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// First participant to claim facilitation; never cleared
    pub facilitator_id: Option<String>,

    /// Live copy of the task being voted on
    pub current_task: Option<Task>,

    /// Every task created in this session, in creation order
    pub tasks: Vec<Task>,

    /// Participants in join order; the same id may appear more than once
    pub participants: Vec<Participant>,
}

impl Session {
    /// An empty session: no facilitator, no tasks, nobody joined
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name for a user id (first matching join wins)
    pub fn participant_name(&self, user_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.id == user_id)
            .map(|p| p.name.as_str())
    }

    /// Whether the given user is the facilitator
    pub fn is_facilitator(&self, user_id: &str) -> bool {
        self.facilitator_id.as_deref() == Some(user_id)
    }

    /// History entry for a task id
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

//! Session state machine
//!
//! `SessionMachine` owns one `Session` and applies every transition to it.
//! Each operation returns `Ok(Outcome)` when the call was valid and
//! `Err(Rejection)` when a precondition failed. A rejected call never
//! touches the session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Participant, Session, Task, VoteValue};
use crate::rejection::Rejection;
use crate::tally::{OutlierPolicy, Tally};

/// Result of a valid operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The session changed
    Applied,
    /// The call was valid but there was nothing to change
    Unchanged,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// What every transition returns
pub type Transition = Result<Outcome, Rejection>;

/// Rules a session runs under
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Only the facilitator may create, reveal, reset, select or finalize
    pub enforce_facilitator: bool,

    /// Outlier threshold used for results
    pub outliers: OutlierPolicy,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            enforce_facilitator: true,
            outliers: OutlierPolicy::default(),
        }
    }
}

/// A state transition requested by a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Join { name: String },
    BecomeFacilitator,
    CreateTask { title: String },
    Vote { value: VoteValue },
    Reveal,
    Reset,
    SelectTask { task_id: String },
    Finalize { estimate: VoteValue },
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::BecomeFacilitator => "become_facilitator",
            Self::CreateTask { .. } => "create_task",
            Self::Vote { .. } => "vote",
            Self::Reveal => "reveal",
            Self::Reset => "reset",
            Self::SelectTask { .. } => "select_task",
            Self::Finalize { .. } => "finalize",
        }
    }
}

/// Owns a session and enforces its transition rules
#[derive(Debug, Clone)]
pub struct SessionMachine {
    session: Session,
    policy: SessionPolicy,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl SessionMachine {
    /// Start an empty session
    pub fn new(policy: SessionPolicy) -> Self {
        debug!(?policy, "SessionMachine::new: called");
        Self {
            session: Session::new(),
            policy,
        }
    }

    /// Resume from an existing session value
    pub fn from_session(session: Session, policy: SessionPolicy) -> Self {
        Self { session, policy }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn facilitator_id(&self) -> Option<&str> {
        self.session.facilitator_id.as_deref()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.session.current_task.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.session.tasks
    }

    pub fn participants(&self) -> &[Participant] {
        &self.session.participants
    }

    pub fn participant_name(&self, user_id: &str) -> Option<&str> {
        self.session.participant_name(user_id)
    }

    pub fn is_facilitator(&self, user_id: &str) -> bool {
        self.session.is_facilitator(user_id)
    }

    /// Whether the user has voted on the current task
    pub fn has_voted(&self, user_id: &str) -> bool {
        self.vote_of(user_id).is_some()
    }

    /// The user's vote on the current task
    pub fn vote_of(&self, user_id: &str) -> Option<VoteValue> {
        self.current_task().and_then(|t| t.vote_of(user_id))
    }

    /// Dispatch an action on behalf of `caller_id`
    pub fn apply(&mut self, caller_id: &str, action: Action) -> Transition {
        debug!(%caller_id, action = action.name(), "apply: called");
        match action {
            Action::Join { name } => self.join(caller_id, &name),
            Action::BecomeFacilitator => self.become_facilitator(caller_id),
            Action::CreateTask { title } => self.create_task(caller_id, &title),
            Action::Vote { value } => self.vote(caller_id, value),
            Action::Reveal => self.reveal_votes(caller_id),
            Action::Reset => self.reset_voting(caller_id),
            Action::SelectTask { task_id } => self.select_task(caller_id, &task_id),
            Action::Finalize { estimate } => self.finalize(caller_id, estimate),
        }
    }

    /// Add a participant. The same id may join more than once.
    pub fn join(&mut self, caller_id: &str, name: &str) -> Transition {
        debug!(%caller_id, %name, "join: called");
        let caller_id = non_empty(caller_id, "participant id")?;
        let name = non_empty(name, "name")?;
        self.session.participants.push(Participant::new(caller_id, name));
        Ok(Outcome::Applied)
    }

    /// Claim facilitation. The first claim wins permanently.
    pub fn become_facilitator(&mut self, caller_id: &str) -> Transition {
        debug!(%caller_id, facilitator = ?self.session.facilitator_id, "become_facilitator: called");
        let caller_id = non_empty(caller_id, "participant id")?;
        match self.session.facilitator_id.as_deref() {
            Some(current) if current == caller_id => Ok(Outcome::Unchanged),
            Some(_) => Err(Rejection::FacilitatorAlreadyClaimed),
            None => {
                self.session.facilitator_id = Some(caller_id.to_string());
                Ok(Outcome::Applied)
            }
        }
    }

    /// Create a task, record it in history and make it current
    pub fn create_task(&mut self, caller_id: &str, title: &str) -> Transition {
        debug!(%caller_id, %title, "create_task: called");
        self.require_facilitator(caller_id)?;
        let title = non_empty(title, "task title")?;
        let task = Task::new(title);
        debug!(task_id = %task.id, "create_task: created");
        self.session.tasks.push(task.clone());
        self.session.current_task = Some(task);
        Ok(Outcome::Applied)
    }

    /// Cast or replace the caller's vote on the current task
    pub fn vote(&mut self, caller_id: &str, value: VoteValue) -> Transition {
        debug!(%caller_id, %value, "vote: called");
        let caller_id = non_empty(caller_id, "participant id")?;
        let task = self.session.current_task.as_mut().ok_or(Rejection::NoCurrentTask)?;
        if task.revealed {
            debug!(task_id = %task.id, "vote: task already revealed");
            return Err(Rejection::AlreadyRevealed);
        }
        task.cast(caller_id, value);
        Ok(Outcome::Applied)
    }

    /// Reveal votes on the current task
    pub fn reveal_votes(&mut self, caller_id: &str) -> Transition {
        debug!(%caller_id, "reveal_votes: called");
        self.require_facilitator(caller_id)?;
        let task = self.session.current_task.as_mut().ok_or(Rejection::NoCurrentTask)?;
        if task.revealed {
            return Ok(Outcome::Unchanged);
        }
        task.revealed = true;
        Ok(Outcome::Applied)
    }

    /// Clear votes and hide them again; the task keeps its id and title
    pub fn reset_voting(&mut self, caller_id: &str) -> Transition {
        debug!(%caller_id, "reset_voting: called");
        self.require_facilitator(caller_id)?;
        let task = self.session.current_task.as_mut().ok_or(Rejection::NoCurrentTask)?;
        if task.votes.is_empty() && !task.revealed {
            return Ok(Outcome::Unchanged);
        }
        task.votes.clear();
        task.revealed = false;
        Ok(Outcome::Applied)
    }

    /// Start a fresh round on a task from history
    ///
    /// The history entry itself is not touched.
    pub fn select_task(&mut self, caller_id: &str, task_id: &str) -> Transition {
        debug!(%caller_id, %task_id, "select_task: called");
        self.require_facilitator(caller_id)?;
        let round = self
            .session
            .find_task(task_id)
            .map(Task::fresh_round)
            .ok_or_else(|| Rejection::TaskNotFound(task_id.to_string()))?;
        self.session.current_task = Some(round);
        Ok(Outcome::Applied)
    }

    /// Record the agreed estimate for the revealed current task
    ///
    /// Stamps both the live copy and the history entry.
    pub fn finalize(&mut self, caller_id: &str, estimate: VoteValue) -> Transition {
        debug!(%caller_id, %estimate, "finalize: called");
        self.require_facilitator(caller_id)?;
        let task = self.session.current_task.as_mut().ok_or(Rejection::NoCurrentTask)?;
        if !task.revealed {
            return Err(Rejection::NotRevealed);
        }
        if task.final_estimate == Some(estimate) {
            return Ok(Outcome::Unchanged);
        }
        task.final_estimate = Some(estimate);
        let task_id = task.id.clone();
        if let Some(entry) = self.session.tasks.iter_mut().find(|t| t.id == task_id) {
            entry.final_estimate = Some(estimate);
        }
        Ok(Outcome::Applied)
    }

    /// Results for the current task, if it has been revealed
    pub fn results(&self) -> Option<Tally> {
        self.current_task()
            .filter(|t| t.revealed)
            .map(|t| Tally::compute(&self.session, t, self.policy.outliers))
    }

    fn require_facilitator(&self, caller_id: &str) -> Result<(), Rejection> {
        // Ids are stored trimmed
        if self.policy.enforce_facilitator && !self.session.is_facilitator(caller_id.trim()) {
            debug!(%caller_id, "require_facilitator: caller is not the facilitator");
            return Err(Rejection::NotFacilitator);
        }
        Ok(())
    }
}

/// Trim input and reject it if nothing is left
fn non_empty<'a>(input: &'a str, field: &'static str) -> Result<&'a str, Rejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Rejection::EmptyInput(field));
    }
    Ok(trimmed)
}

//! SessionManager - actor that owns one SessionMachine
//!
//! Every operation on a session goes through this actor's channel, so a
//! session has exactly one writer and reads always observe earlier writes.

use pokercore::{Action, Outcome, Session, SessionId, SessionMachine, SessionPolicy, Tally, VoteValue};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use super::messages::{SessionCommand, SessionError, SessionResponse};

/// Default pending commands per actor
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Default buffered change events per actor
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Broadcast after every transition that changed the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    /// Session that changed
    pub session_id: SessionId,
    /// Who caused the change
    pub caller_id: String,
    /// What they did
    pub action: Action,
    /// Session state right after the change
    pub snapshot: Session,
}

/// Handle to send commands to a session's actor
#[derive(Clone)]
pub struct SessionManager {
    session_id: SessionId,
    tx: mpsc::Sender<SessionCommand>,
    /// Broadcast sender for change notifications
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Spawn a new actor owning an empty session
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(session_id: SessionId, policy: SessionPolicy, command_buffer: usize, event_buffer: usize) -> Self {
        debug!(%session_id, ?policy, command_buffer, event_buffer, "spawn: called");
        let (tx, rx) = mpsc::channel(command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(event_buffer.max(1));

        let machine = SessionMachine::new(policy);
        tokio::spawn(actor_loop(session_id.clone(), machine, rx, event_tx.clone()));

        info!(%session_id, "SessionManager spawned");

        Self {
            session_id,
            tx,
            event_tx,
        }
    }

    /// Spawn with default buffer sizes
    pub fn spawn_default(session_id: SessionId, policy: SessionPolicy) -> Self {
        Self::spawn(session_id, policy, DEFAULT_COMMAND_BUFFER, DEFAULT_EVENT_BUFFER)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Subscribe to change events
    ///
    /// Only events sent after subscribing are received.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        debug!(session_id = %self.session_id, "subscribe_events: called");
        self.event_tx.subscribe()
    }

    /// Whether the actor is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    // === Transitions ===

    /// Apply an action on behalf of a caller
    pub async fn apply(&self, caller_id: &str, action: Action) -> SessionResponse<Outcome> {
        debug!(session_id = %self.session_id, %caller_id, action = action.name(), "apply: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Apply {
                caller_id: caller_id.to_string(),
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        let result = reply_rx.await.map_err(|_| SessionError::ChannelError)?;
        Ok(result?)
    }

    /// Join the session under a display name
    pub async fn join(&self, caller_id: &str, name: &str) -> SessionResponse<Outcome> {
        self.apply(
            caller_id,
            Action::Join {
                name: name.to_string(),
            },
        )
        .await
    }

    /// Claim facilitation
    pub async fn become_facilitator(&self, caller_id: &str) -> SessionResponse<Outcome> {
        self.apply(caller_id, Action::BecomeFacilitator).await
    }

    /// Create a task and make it current
    pub async fn create_task(&self, caller_id: &str, title: &str) -> SessionResponse<Outcome> {
        self.apply(
            caller_id,
            Action::CreateTask {
                title: title.to_string(),
            },
        )
        .await
    }

    /// Vote on the current task
    pub async fn vote(&self, caller_id: &str, value: VoteValue) -> SessionResponse<Outcome> {
        self.apply(caller_id, Action::Vote { value }).await
    }

    /// Vote with raw points, rejecting anything off the scale
    pub async fn vote_points(&self, caller_id: &str, points: i64) -> SessionResponse<Outcome> {
        debug!(%caller_id, points, "vote_points: called");
        let value = VoteValue::from_points(points)?;
        self.vote(caller_id, value).await
    }

    /// Reveal votes on the current task
    pub async fn reveal_votes(&self, caller_id: &str) -> SessionResponse<Outcome> {
        self.apply(caller_id, Action::Reveal).await
    }

    /// Clear votes and start the round again
    pub async fn reset_voting(&self, caller_id: &str) -> SessionResponse<Outcome> {
        self.apply(caller_id, Action::Reset).await
    }

    /// Re-run voting on a task from history
    pub async fn select_task(&self, caller_id: &str, task_id: &str) -> SessionResponse<Outcome> {
        self.apply(
            caller_id,
            Action::SelectTask {
                task_id: task_id.to_string(),
            },
        )
        .await
    }

    /// Record the agreed estimate for the revealed task
    pub async fn finalize(&self, caller_id: &str, estimate: VoteValue) -> SessionResponse<Outcome> {
        self.apply(caller_id, Action::Finalize { estimate }).await
    }

    // === Reads ===

    /// Current session state
    pub async fn snapshot(&self) -> SessionResponse<Session> {
        debug!(session_id = %self.session_id, "snapshot: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)
    }

    /// Results for the current task, computed fresh; `None` until revealed
    pub async fn results(&self) -> SessionResponse<Option<Tally>> {
        debug!(session_id = %self.session_id, "results: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Results { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)
    }

    /// Stop the actor
    pub async fn shutdown(&self) -> SessionResponse<()> {
        debug!(session_id = %self.session_id, "shutdown: called");
        self.tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelError)
    }
}

/// The actor loop that owns the machine and processes commands
async fn actor_loop(
    session_id: SessionId,
    mut machine: SessionMachine,
    mut rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    debug!(%session_id, "SessionManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Apply {
                caller_id,
                action,
                reply,
            } => {
                debug!(%caller_id, action = action.name(), "actor_loop: Apply command");
                let result = machine.apply(&caller_id, action.clone());
                match &result {
                    Ok(Outcome::Applied) => {
                        // No subscribers is fine
                        let _ = event_tx.send(SessionEvent {
                            session_id: session_id.clone(),
                            caller_id,
                            action,
                            snapshot: machine.session().clone(),
                        });
                    }
                    Ok(Outcome::Unchanged) => {
                        debug!(action = action.name(), "actor_loop: nothing to change");
                    }
                    Err(rejection) => {
                        warn!(%session_id, %caller_id, action = action.name(), reason = rejection.kind(), "Rejected transition");
                    }
                }
                let _ = reply.send(result);
            }

            SessionCommand::Snapshot { reply } => {
                debug!("actor_loop: Snapshot command");
                let _ = reply.send(machine.session().clone());
            }

            SessionCommand::Results { reply } => {
                debug!("actor_loop: Results command");
                let _ = reply.send(machine.results());
            }

            SessionCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                info!(%session_id, "SessionManager shutting down");
                break;
            }
        }
    }

    debug!(%session_id, "SessionManager actor stopped");
}

//! Session registry
//!
//! Maps session ids to their actors. Operations addressed to an id the
//! registry does not know fail with `Rejection::NoSession`.

use std::collections::HashMap;

use pokercore::{Action, Outcome, Rejection, SessionId};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::state::{SessionError, SessionManager, SessionResponse};

/// Live sessions keyed by id
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionManager>>,
    config: SessionConfig,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        debug!(?config, "SessionRegistry::new: called");
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Start a new session under a fresh id
    pub async fn create_session(&self) -> SessionManager {
        let session_id = SessionId::generate();
        debug!(%session_id, "create_session: called");
        let manager = self.spawn(session_id.clone());
        self.sessions.write().await.insert(session_id, manager.clone());
        manager
    }

    /// Get the session with this id, starting it if it does not exist yet
    pub async fn ensure_session(&self, session_id: &SessionId) -> SessionManager {
        debug!(%session_id, "ensure_session: called");
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            return existing.clone();
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have created it between the two locks
        sessions
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn(session_id.clone()))
            .clone()
    }

    /// Handle for an existing session
    pub async fn get(&self, session_id: &SessionId) -> SessionResponse<SessionManager> {
        debug!(%session_id, "get: called");
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(SessionError::Rejected(Rejection::NoSession))
    }

    /// Apply an action to the addressed session
    pub async fn apply(&self, session_id: &SessionId, caller_id: &str, action: Action) -> SessionResponse<Outcome> {
        debug!(%session_id, %caller_id, action = action.name(), "apply: called");
        let manager = self.get(session_id).await?;
        manager.apply(caller_id, action).await
    }

    /// Ids of every live session, sorted
    pub async fn list(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Stop a session's actor and forget it
    pub async fn close_session(&self, session_id: &SessionId) -> SessionResponse<()> {
        debug!(%session_id, "close_session: called");
        let manager = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or(SessionError::Rejected(Rejection::NoSession))?;
        info!(%session_id, "Closing session");
        manager.shutdown().await
    }

    /// Stop every session
    pub async fn shutdown_all(&self) {
        let drained: Vec<SessionManager> = self.sessions.write().await.drain().map(|(_, m)| m).collect();
        info!(count = drained.len(), "Shutting down all sessions");
        for manager in drained {
            if let Err(e) = manager.shutdown().await {
                debug!(session_id = %manager.session_id(), error = %e, "shutdown_all: actor already gone");
            }
        }
    }

    fn spawn(&self, session_id: SessionId) -> SessionManager {
        SessionManager::spawn(
            session_id,
            self.config.policy(),
            self.config.command_buffer,
            self.config.event_buffer,
        )
    }
}

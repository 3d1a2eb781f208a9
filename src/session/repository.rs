//! Session storage.

use super::model::{Session, SessionId};
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};

/// Repository error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Repository error: {} at {}:{}", message, file, line)]
pub struct RepositoryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RepositoryError {
    /// Creates a new repository error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Key-value storage for sessions.
///
/// No transactional guarantees: concurrent writers of the same id resolve
/// as last write wins.
#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads a session. Returns `None` if absent.
    async fn get_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Stores a session, replacing any previous version.
    async fn save(&self, session: Session) -> Result<Session, RepositoryError>;

    /// Removes a session. Returns true if it existed.
    async fn delete(&self, id: &SessionId) -> Result<bool, RepositoryError>;

    /// Every stored session, oldest first.
    async fn get_all(&self) -> Result<Vec<Session>, RepositoryError>;
}

/// Process-resident session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    /// Creates an empty repository.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory session repository");
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self), fields(session_id = %id))]
    async fn get_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| RepositoryError::new(format!("Session store poisoned: {}", e)))?;
        let session = sessions.get(id).cloned();
        if session.is_none() {
            debug!("Session not found");
        }
        Ok(session)
    }

    #[instrument(
        skip(self, session),
        fields(session_id = %session.id(), status = %session.status())
    )]
    async fn save(&self, session: Session) -> Result<Session, RepositoryError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| RepositoryError::new(format!("Session store poisoned: {}", e)))?;
        sessions.insert(session.id().clone(), session.clone());
        debug!("Session saved");
        Ok(session)
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn delete(&self, id: &SessionId) -> Result<bool, RepositoryError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| RepositoryError::new(format!("Session store poisoned: {}", e)))?;
        let removed = sessions.remove(id).is_some();
        info!(removed, "Session deleted");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Session>, RepositoryError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| RepositoryError::new(format!("Session store poisoned: {}", e)))?;
        let mut all: Vec<Session> = sessions.values().cloned().collect();
        all.sort_by_key(|s| s.created_at());
        info!(count = all.len(), "Listed sessions");
        Ok(all)
    }
}

//! Application service tying sessions, storage, simulation and notification.

use super::error::SessionError;
use super::model::{Session, SessionId};
use super::repository::{RepositoryError, SessionRepository};
use super::simulator::Simulator;
use crate::notify::NotificationSink;
use crate::strategy::{StrategyError, StrategyKind};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Errors surfaced by [`SessionService`].
#[derive(Debug, Clone, derive_more::Display, derive_more::From)]
pub enum ServiceError {
    /// No session with this id.
    #[display("Session {_0} not found")]
    #[from(ignore)]
    NotFound(SessionId),
    /// A session operation failed.
    #[display("{_0}")]
    Session(SessionError),
    /// Unknown or unregistered strategy.
    #[display("{_0}")]
    Strategy(StrategyError),
    /// Storage failed.
    #[display("{_0}")]
    Repository(RepositoryError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::NotFound(_) => None,
            ServiceError::Session(e) => Some(e),
            ServiceError::Strategy(e) => Some(e),
            ServiceError::Repository(e) => Some(e),
        }
    }
}

/// Runs session commands: load, apply, drain events, save.
///
/// Each command saves the whole session afterwards. Two callers driving the
/// same session concurrently resolve as last write wins.
#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    simulator: Simulator,
    sink: Arc<dyn NotificationSink>,
    simulation_timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl SessionService {
    /// Creates a service with no overall simulation deadline.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        simulator: Simulator,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            simulator,
            sink,
            simulation_timeout: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancels a simulation still running after `timeout`.
    pub fn with_simulation_timeout(mut self, timeout: Duration) -> Self {
        self.simulation_timeout = Some(timeout);
        self
    }

    /// Cancels running simulations when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Registered strategies.
    pub fn strategies(&self) -> BTreeSet<StrategyKind> {
        self.simulator.strategies().supported_strategies()
    }

    fn ensure_supported(&self, strategy: StrategyKind) -> Result<(), ServiceError> {
        if self.simulator.strategies().supports(strategy) {
            Ok(())
        } else {
            Err(StrategyError::UnsupportedStrategy(strategy.to_string()).into())
        }
    }

    async fn persist(&self, mut session: Session) -> Result<Session, ServiceError> {
        let events = session.drain_events();
        self.sink.publish_all(session.id(), &events);
        Ok(self.repository.save(session).await?)
    }

    async fn load(&self, id: &SessionId) -> Result<Session, ServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }

    /// Creates and stores a session.
    #[instrument(skip(self))]
    pub async fn create_session(&self, strategy: StrategyKind) -> Result<Session, ServiceError> {
        self.ensure_supported(strategy)?;
        let session = Session::new(strategy);
        info!(session_id = %session.id(), "Session created");
        self.persist(session).await
    }

    /// Loads a session.
    #[instrument(skip(self))]
    pub async fn get_session(&self, id: &SessionId) -> Result<Session, ServiceError> {
        self.load(id).await
    }

    /// Every session, oldest first.
    #[instrument(skip(self))]
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ServiceError> {
        Ok(self.repository.get_all().await?)
    }

    /// Deletes a session.
    #[instrument(skip(self))]
    pub async fn delete_session(&self, id: &SessionId) -> Result<(), ServiceError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id.clone()))
        }
    }

    /// Changes a session's strategy.
    #[instrument(skip(self))]
    pub async fn set_strategy(
        &self,
        id: &SessionId,
        strategy: StrategyKind,
    ) -> Result<Session, ServiceError> {
        self.ensure_supported(strategy)?;
        let mut session = self.load(id).await?;
        session.set_strategy(strategy)?;
        self.persist(session).await
    }

    /// Simulates a game for a stored session.
    ///
    /// The session is saved whatever the outcome, so a failed simulation
    /// leaves a `Failed` session behind. Returns the saved session on
    /// success.
    #[instrument(skip(self))]
    pub async fn simulate(&self, id: &SessionId) -> Result<Session, ServiceError> {
        let mut session = self.load(id).await?;
        let cancel = self.shutdown.child_token();

        let deadline = self.simulation_timeout.map(|limit| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                warn!(?limit, "Simulation deadline reached");
                cancel.cancel();
            })
        });

        let outcome = self.simulator.simulate_with_cancel(&mut session, &cancel).await;
        if let Some(handle) = deadline {
            handle.abort();
        }

        match outcome {
            Ok(()) => self.persist(session).await,
            Err(err @ SessionError::InvalidSessionState(_)) => Err(err.into()),
            Err(err) => {
                self.persist(session).await?;
                Err(err.into())
            }
        }
    }
}

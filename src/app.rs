//! Wiring of engine, strategies, storage and notification from config.

use crate::config::SimulatorConfig;
use crate::engine::{EngineError, GameEngine, HttpGameEngine, LocalGameEngine};
use crate::notify::{BroadcastSink, FanoutSink, NotificationSink, TracingSink};
use crate::server::AppState;
use crate::session::{InMemorySessionRepository, SessionService, Simulator};
use crate::strategy::MoveGeneratorFactory;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Events buffered per broadcast subscriber.
const EVENT_BUFFER: usize = 256;

/// Fully wired services for one process.
#[derive(Clone)]
pub struct Services {
    /// Engine serving `/api/games`.
    pub engine: LocalGameEngine,
    /// Session orchestration.
    pub sessions: SessionService,
    /// Live feed of session events.
    pub events: BroadcastSink,
}

impl Services {
    /// Builds the services described by `config`.
    ///
    /// Sessions play against the remote engine at `engine_url` when set,
    /// otherwise against the same in-process engine the API serves.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client for a remote engine cannot be built.
    #[instrument(skip(config, shutdown), fields(engine_url = ?config.engine_url()))]
    pub fn from_config(
        config: &SimulatorConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, EngineError> {
        let engine = LocalGameEngine::new();
        let remote: Arc<dyn GameEngine> = match config.engine_url() {
            Some(url) => {
                info!(%url, "Sessions will play against remote engine");
                Arc::new(HttpGameEngine::new(url, config.request_timeout())?)
            }
            None => {
                info!("Sessions will play against in-process engine");
                Arc::new(engine.clone())
            }
        };

        let strategies = Arc::new(MoveGeneratorFactory::with_strategies(
            config.enabled_strategies().iter().copied(),
        ));
        let simulator =
            Simulator::new(remote, strategies).with_request_timeout(config.request_timeout());

        let events = BroadcastSink::new(EVENT_BUFFER);
        let sink: Arc<dyn NotificationSink> = Arc::new(
            FanoutSink::new()
                .with(Arc::new(TracingSink))
                .with(Arc::new(events.clone())),
        );

        let repository = Arc::new(InMemorySessionRepository::new());
        let mut sessions = SessionService::new(repository, simulator, sink).with_shutdown(shutdown);
        if let Some(limit) = config.simulation_timeout() {
            sessions = sessions.with_simulation_timeout(limit);
        }

        Ok(Self {
            engine,
            sessions,
            events,
        })
    }

    /// Handler state for the full API.
    pub fn app_state(&self, config: &SimulatorConfig) -> AppState {
        AppState::new(self.engine.clone(), self.sessions.clone(), *config.default_strategy())
    }
}

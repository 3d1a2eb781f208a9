//! Simulation loop driving a session's game to completion.

use super::error::{SessionError, SimulationError};
use super::model::{Session, SessionStatus};
use crate::engine::GameEngine;
use crate::games::tictactoe::Player;
use crate::strategy::MoveGeneratorFactory;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Default deadline for one engine call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Plays sessions against a game engine.
///
/// The loop is strictly sequential: each engine response feeds the next
/// step, so moves reach the engine in move-number order. Turn order is
/// tracked locally for move generation while the engine stays the sole
/// judge of legality and outcome.
#[derive(Clone)]
pub struct Simulator {
    engine: Arc<dyn GameEngine>,
    strategies: Arc<MoveGeneratorFactory>,
    request_timeout: Duration,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("strategies", &self.strategies.supported_strategies())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Forces the session to `Failed` if dropped while the simulation is running.
///
/// Covers the caller dropping the simulation future at an await point.
struct RunningGuard<'a> {
    session: &'a mut Session,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.session.status() == SessionStatus::InProgress {
            warn!(session_id = %self.session.id(), "Simulation abandoned mid-loop");
            self.session.fail_simulation();
        }
    }
}

impl Simulator {
    /// Creates a simulator with the default request timeout.
    pub fn new(engine: Arc<dyn GameEngine>, strategies: Arc<MoveGeneratorFactory>) -> Self {
        Self {
            engine,
            strategies,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the deadline for each engine call.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Strategy registry used to resolve each session's generator.
    pub fn strategies(&self) -> &MoveGeneratorFactory {
        &self.strategies
    }

    /// Simulates one game with no external cancellation.
    ///
    /// # Errors
    ///
    /// See [`Simulator::simulate_with_cancel`].
    pub async fn simulate(&self, session: &mut Session) -> Result<(), SessionError> {
        self.simulate_with_cancel(session, &CancellationToken::new()).await
    }

    /// Simulates one game, attaching a fresh engine game to `session`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSessionState`] if a simulation is
    /// already running; the session is left untouched. Any other failure,
    /// including cancellation through `cancel`, moves the session to
    /// `Failed` and returns [`SessionError::SimulationFailed`].
    #[instrument(
        skip(self, session, cancel),
        fields(session_id = %session.id(), strategy = %session.strategy())
    )]
    pub async fn simulate_with_cancel(
        &self,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        if session.status() == SessionStatus::InProgress {
            warn!("Simulation requested while one is running");
            return Err(SessionError::invalid_state("simulation already in progress"));
        }

        let guard = RunningGuard { session };
        match self.run(&mut *guard.session, cancel).await {
            Ok(()) => {
                info!(
                    result = ?guard.session.result(),
                    winner = ?guard.session.winner(),
                    moves = guard.session.moves().len(),
                    "Simulation finished"
                );
                Ok(())
            }
            Err(cause) => {
                error!(error = %cause, "Simulation failed");
                guard.session.fail_simulation();
                Err(SessionError::SimulationFailed {
                    session_id: guard.session.id().clone(),
                    cause,
                })
            }
        }
    }

    async fn run(
        &self,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<(), SimulationError> {
        let generator = self.strategies.create_generator(session.strategy())?;

        let created = self
            .call("create_game", cancel, self.engine.create_game())
            .await?;
        let game_id = created.game_id;
        session.start_new_game(game_id.clone())?;
        session.start_simulation()?;

        let mut current = Player::X;
        loop {
            let state = self
                .call("get_state", cancel, self.engine.get_state(&game_id))
                .await?;
            if state.status.is_terminal() {
                debug!(status = %state.status, "Engine reports game over before move");
                session.complete_game(state.winner_player())?;
                return Ok(());
            }
            if state.current_player != current {
                return Err(SimulationError::TurnDivergence {
                    local: current,
                    remote: state.current_player,
                });
            }

            let board = state.board();
            let position = generator.generate_move(current, &board)?;
            debug!(player = %current, %position, "Generated move");

            let state = self
                .call("make_move", cancel, self.engine.make_move(&game_id, position))
                .await?;
            session.record_move(position, current)?;

            if state.status.is_terminal() {
                debug!(status = %state.status, "Engine reports game over after move");
                session.complete_game(state.winner_player())?;
                return Ok(());
            }

            current = current.opponent();
        }
    }

    /// Awaits one engine call, racing cancellation and the request deadline.
    async fn call<T>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        request: impl Future<Output = Result<T, crate::engine::EngineError>>,
    ) -> Result<T, SimulationError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(operation, "Cancelled while waiting on engine");
                Err(SimulationError::Cancelled { operation })
            }
            outcome = tokio::time::timeout(self.request_timeout, request) => match outcome {
                Ok(result) => result.map_err(SimulationError::from),
                Err(_) => {
                    warn!(operation, timeout = ?self.request_timeout, "Engine call timed out");
                    Err(SimulationError::TimedOut { operation, after: self.request_timeout })
                }
            },
        }
    }
}

//! Session aggregate.

use super::error::SessionError;
use super::events::SessionEvent;
use crate::games::tictactoe::{GameId, Player, Position};
use crate::strategy::StrategyKind;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a session.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle of a session.
///
/// `Created -> InProgress -> {Completed | Failed}`. `Created` is re-entered
/// whenever a new game is attached; `Failed` is reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SessionStatus {
    /// Waiting for a simulation to start.
    Created,
    /// A simulation is running.
    InProgress,
    /// The game reached a result.
    Completed,
    /// The simulation failed.
    Failed,
}

/// How a completed game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SessionResult {
    /// Somebody won.
    Win,
    /// Nobody won.
    Draw,
}

/// Outcome handed to [`Session::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GameOutcome {
    /// `player` won.
    #[display("{_0} wins")]
    Win(Player),
    /// Draw.
    Draw,
}

impl From<Option<Player>> for GameOutcome {
    fn from(winner: Option<Player>) -> Self {
        winner.map_or(GameOutcome::Draw, GameOutcome::Win)
    }
}

/// A move recorded by a session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    id: String,
    session_id: SessionId,
    player: Player,
    position: Position,
    strategy: StrategyKind,
    move_number: u32,
    timestamp: DateTime<Utc>,
}

impl Move {
    /// Creates a move stamped with a fresh id and the current time.
    pub fn new(
        session_id: SessionId,
        player: Player,
        position: Position,
        strategy: StrategyKind,
        move_number: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            player,
            position,
            strategy,
            move_number,
            timestamp: Utc::now(),
        }
    }
}

/// One simulated game driven by a strategy.
///
/// The session only references the engine's game by id. It owns its moves
/// and its queue of pending events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    game_ids: Vec<GameId>,
    current_game_id: Option<GameId>,
    status: SessionStatus,
    strategy: StrategyKind,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    moves: Vec<Move>,
    result: Option<SessionResult>,
    winner: Option<Player>,
    #[serde(skip)]
    events: Vec<SessionEvent>,
}

impl Session {
    /// Creates a session with a fresh id and queues `SessionCreated`.
    pub fn new(strategy: StrategyKind) -> Self {
        Self::with_id(SessionId::generate(), strategy)
    }

    /// Creates a session with the given id and queues `SessionCreated`.
    #[instrument]
    pub fn with_id(id: SessionId, strategy: StrategyKind) -> Self {
        let created_at = Utc::now();
        info!(session_id = %id, %strategy, "Creating session");
        let mut session = Self {
            id,
            game_ids: Vec::new(),
            current_game_id: None,
            status: SessionStatus::Created,
            strategy,
            created_at,
            started_at: None,
            completed_at: None,
            moves: Vec::new(),
            result: None,
            winner: None,
            events: Vec::new(),
        };
        session.events.push(SessionEvent::SessionCreated {
            session_id: session.id.clone(),
            strategy,
            occurred_at: created_at,
        });
        session
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Every game attached to this session, oldest first.
    pub fn game_ids(&self) -> &[GameId] {
        &self.game_ids
    }

    /// Game currently being played.
    pub fn current_game_id(&self) -> Option<&GameId> {
        self.current_game_id.as_ref()
    }

    /// Lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Strategy used to generate moves.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the current simulation started.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the current game completed or failed.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Moves of the current game, in order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Result of the current game, once completed.
    pub fn result(&self) -> Option<SessionResult> {
        self.result
    }

    /// Winner of the current game, if it was won.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Events raised since the last drain.
    pub fn pending_events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Removes and returns the pending events.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Discards the pending events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn guard(&self, allowed: bool, message: impl Into<String>) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            let message = message.into();
            warn!(
                session_id = %self.id,
                status = ?self.status,
                %message,
                "Session guard rejected operation"
            );
            Err(SessionError::invalid_state(message))
        }
    }

    /// Changes the strategy. Only allowed while `Created`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_strategy(&mut self, strategy: StrategyKind) -> Result<(), SessionError> {
        self.guard(
            self.status == SessionStatus::Created,
            format!("strategy can only change while Created, session is {}", self.status),
        )?;
        debug!(from = %self.strategy, to = %strategy, "Strategy changed");
        self.strategy = strategy;
        Ok(())
    }

    /// Attaches a fresh game and resets the per-game fields.
    ///
    /// Keeps the session id and strategy. Not allowed while a simulation is
    /// running.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start_new_game(&mut self, game_id: GameId) -> Result<(), SessionError> {
        self.guard(
            self.status != SessionStatus::InProgress,
            "cannot start a new game while a simulation is in progress",
        )?;

        self.game_ids.push(game_id.clone());
        self.current_game_id = Some(game_id.clone());
        self.status = SessionStatus::Created;
        self.moves.clear();
        self.result = None;
        self.winner = None;
        self.completed_at = None;

        info!(%game_id, games = self.game_ids.len(), "New game attached");
        self.events.push(SessionEvent::SimulationStarted {
            session_id: self.id.clone(),
            game_id: Some(game_id),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Sets the current game id. Fails if one is already set.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_game_id(&mut self, game_id: GameId) -> Result<(), SessionError> {
        self.guard(self.current_game_id.is_none(), "game id already set")?;
        self.game_ids.push(game_id.clone());
        self.current_game_id = Some(game_id);
        Ok(())
    }

    /// Moves `Created -> InProgress`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start_simulation(&mut self) -> Result<(), SessionError> {
        self.guard(
            self.status == SessionStatus::Created,
            format!("simulation can only start from Created, session is {}", self.status),
        )?;
        let now = Utc::now();
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        info!(game_id = ?self.current_game_id, strategy = %self.strategy, "Simulation started");
        self.events.push(SessionEvent::SimulationStarted {
            session_id: self.id.clone(),
            game_id: self.current_game_id.clone(),
            occurred_at: now,
        });
        Ok(())
    }

    /// Records a move made with this session's strategy.
    ///
    /// Only allowed while `InProgress`. Returns the recorded move.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn record_move(
        &mut self,
        position: Position,
        player: Player,
    ) -> Result<&Move, SessionError> {
        let number = self.next_move_number();
        let mv = Move::new(self.id.clone(), player, position, self.strategy, number);
        self.add_move(mv)?;
        self.moves
            .last()
            .ok_or_else(|| SessionError::invalid_state("move was not recorded"))
    }

    /// Appends an externally built move.
    ///
    /// Only allowed while `InProgress`, and only for moves that name this
    /// session.
    #[instrument(skip(self, mv), fields(session_id = %self.id, move_number = mv.move_number))]
    pub fn add_move(&mut self, mv: Move) -> Result<(), SessionError> {
        self.guard(
            self.status == SessionStatus::InProgress,
            format!("moves can only be recorded while InProgress, session is {}", self.status),
        )?;
        self.guard(
            mv.session_id == self.id,
            format!("move belongs to session {}, not {}", mv.session_id, self.id),
        )?;

        debug!(player = %mv.player, position = %mv.position, "Move recorded");
        self.events.push(SessionEvent::MoveMade {
            session_id: self.id.clone(),
            game_id: self.current_game_id.clone(),
            player: mv.player,
            position: mv.position,
            move_number: mv.move_number,
            occurred_at: mv.timestamp,
        });
        self.moves.push(mv);
        Ok(())
    }

    fn next_move_number(&self) -> u32 {
        self.moves.len() as u32 + 1
    }

    /// Completes the game from the winner reported by the engine.
    ///
    /// `Some(player)` is a win, `None` a draw.
    pub fn complete_game(&mut self, winner: Option<Player>) -> Result<(), SessionError> {
        self.complete(GameOutcome::from(winner))
    }

    /// Moves `InProgress -> Completed` and records the outcome.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn complete(&mut self, outcome: GameOutcome) -> Result<(), SessionError> {
        self.guard(self.status != SessionStatus::Completed, "session already completed")?;
        self.guard(
            self.status == SessionStatus::InProgress,
            format!("only a running simulation can complete, session is {}", self.status),
        )?;

        let (result, winner) = match outcome {
            GameOutcome::Win(player) => (SessionResult::Win, Some(player)),
            GameOutcome::Draw => (SessionResult::Draw, None),
        };
        let now = Utc::now();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        self.result = Some(result);
        self.winner = winner;

        info!(%result, ?winner, moves = self.moves.len(), "Game completed");
        self.events.push(SessionEvent::GameCompleted {
            session_id: self.id.clone(),
            game_id: self.current_game_id.clone(),
            result,
            winner,
            occurred_at: now,
        });
        Ok(())
    }

    /// Forces the session into `Failed` from any state.
    ///
    /// Reserved for the simulation loop's failure handling.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn fail_simulation(&mut self) {
        warn!(from = %self.status, "Simulation failed");
        self.status = SessionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }
}

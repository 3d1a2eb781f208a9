//! Strictly Sim - tic-tac-toe rule engine and game simulation sessions
//!
//! A session picks a move generation strategy and plays a whole game of
//! tic-tac-toe against a game engine, recording every move and the result.
//!
//! # Architecture
//!
//! - **Games**: The tic-tac-toe rule engine (board, positions, win and draw rules)
//! - **Strategy**: Pluggable move generators (random, rule-based, minimax)
//! - **Engine**: The game engine contract, in-process or over HTTP
//! - **Session**: The session aggregate, simulation loop and session service
//! - **Server**: HTTP API for games and sessions
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_sim::{LocalGameEngine, MoveGeneratorFactory, Session, Simulator, StrategyKind};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let simulator = Simulator::new(
//!     Arc::new(LocalGameEngine::new()),
//!     Arc::new(MoveGeneratorFactory::with_defaults()),
//! );
//!
//! let mut session = Session::new(StrategyKind::RuleBased);
//! simulator.simulate(&mut session).await?;
//! println!("{:?} {:?}", session.result(), session.winner());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod app;
mod config;
mod engine;
mod games;
mod notify;
mod server;
mod session;
mod strategy;

// Crate-level exports - Wiring and configuration
pub use app::Services;
pub use config::{ConfigError, ENGINE_URL_ENV, PORT_ENV, SimulatorConfig};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, BoardRows, Game, GameError, GameId, GameStatus, MoveError, Player, Position,
    PositionError, RawPosition, rules,
};

// Crate-level exports - Strategies
pub use strategy::{
    AiGenerator, MoveGenerator, MoveGeneratorFactory, RandomGenerator, RuleBasedGenerator,
    StrategyError, StrategyKind,
};

// Crate-level exports - Game engine
pub use engine::{
    CreatedGame, EngineError, GameEngine, GameStateView, HttpGameEngine, LocalGameEngine,
    RemoteStatus,
};

// Crate-level exports - Sessions
pub use session::{
    DEFAULT_REQUEST_TIMEOUT, GameOutcome, InMemorySessionRepository, Move, RepositoryError,
    ServiceError, Session, SessionError, SessionEvent, SessionId, SessionRepository, SessionResult,
    SessionService, SessionStatus, SimulationError, Simulator,
};

// Crate-level exports - Notification
pub use notify::{BroadcastSink, FanoutSink, NotificationSink, TracingSink};

// Crate-level exports - HTTP API
pub use server::{
    ApiError, AppState, CreateSessionRequest, ErrorBody, SetStrategyRequest, StrategiesResponse,
    engine_router, router, serve,
};

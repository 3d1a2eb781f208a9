//! Simulation sessions.

mod error;
mod events;
mod model;
mod repository;
mod service;
mod simulator;

pub use error::{SessionError, SimulationError};
pub use events::SessionEvent;
pub use model::{GameOutcome, Move, Session, SessionId, SessionResult, SessionStatus};
pub use repository::{InMemorySessionRepository, RepositoryError, SessionRepository};
pub use service::{ServiceError, SessionService};
pub use simulator::{DEFAULT_REQUEST_TIMEOUT, Simulator};

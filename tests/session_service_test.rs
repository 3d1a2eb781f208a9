//! Tests for session storage and the session service.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use strictly_sim::{
    BroadcastSink, CreatedGame, EngineError, GameEngine, GameId, GameStateView,
    InMemorySessionRepository, LocalGameEngine, MoveGeneratorFactory, NotificationSink, Player,
    Position, RemoteStatus, ServiceError, Session, SessionError, SessionEvent, SessionId,
    SessionRepository, SessionService, SessionStatus, SimulationError, Simulator, StrategyError,
    StrategyKind, TracingSink,
};
use tokio_util::sync::CancellationToken;

/// Engine that creates games and then never answers a move.
struct StalledEngine;

#[async_trait]
impl GameEngine for StalledEngine {
    async fn create_game(&self) -> Result<CreatedGame, EngineError> {
        Ok(CreatedGame {
            game_id: GameId::from("stalled"),
            created_at: Utc::now(),
        })
    }

    async fn make_move(&self, _: &GameId, _: Position) -> Result<GameStateView, EngineError> {
        std::future::pending().await
    }

    async fn get_state(&self, game_id: &GameId) -> Result<GameStateView, EngineError> {
        Ok(GameStateView {
            game_id: game_id.clone(),
            status: RemoteStatus::InProgress,
            current_player: Player::X,
            winner: None,
            board: [[None; 3]; 3],
            created_at: Utc::now(),
            last_move_at: None,
        })
    }
}

fn service_with(engine: Arc<dyn GameEngine>, sink: Arc<dyn NotificationSink>) -> SessionService {
    let simulator = Simulator::new(engine, Arc::new(MoveGeneratorFactory::with_defaults()));
    SessionService::new(Arc::new(InMemorySessionRepository::new()), simulator, sink)
}

fn local_service() -> SessionService {
    service_with(Arc::new(LocalGameEngine::new()), Arc::new(TracingSink))
}

#[tokio::test]
async fn test_repository_crud() {
    let repo = InMemorySessionRepository::new();
    let first = Session::new(StrategyKind::Random);
    let second = Session::new(StrategyKind::Ai);

    repo.save(first.clone()).await.unwrap();
    repo.save(second.clone()).await.unwrap();

    let loaded = repo.get_by_id(first.id()).await.unwrap().unwrap();
    assert_eq!(loaded.id(), first.id());
    assert!(repo.get_by_id(&SessionId::from("missing")).await.unwrap().is_none());

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].created_at() <= all[1].created_at());

    assert!(repo.delete(first.id()).await.unwrap());
    assert!(!repo.delete(first.id()).await.unwrap());
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_repository_save_replaces() {
    let repo = InMemorySessionRepository::new();
    let mut session = Session::new(StrategyKind::Random);
    repo.save(session.clone()).await.unwrap();

    session.set_strategy(StrategyKind::RuleBased).unwrap();
    repo.save(session.clone()).await.unwrap();

    let loaded = repo.get_by_id(session.id()).await.unwrap().unwrap();
    assert_eq!(loaded.strategy(), StrategyKind::RuleBased);
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_service_create_and_simulate() {
    let service = local_service();
    let session = service.create_session(StrategyKind::RuleBased).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Created);
    assert!(session.pending_events().is_empty());

    let played = service.simulate(session.id()).await.unwrap();
    assert_eq!(played.status(), SessionStatus::Completed);

    let stored = service.get_session(session.id()).await.unwrap();
    assert_eq!(stored.status(), SessionStatus::Completed);
    assert_eq!(stored.moves().len(), played.moves().len());
}

#[tokio::test]
async fn test_service_publishes_drained_events() {
    let sink = BroadcastSink::new(64);
    let mut events = sink.subscribe();
    let service = service_with(Arc::new(LocalGameEngine::new()), Arc::new(sink));

    let session = service.create_session(StrategyKind::Ai).await.unwrap();
    service.simulate(session.id()).await.unwrap();

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.session_id(), session.id());
        names.push(event.name());
    }
    assert_eq!(names.first(), Some(&"SessionCreated"));
    assert_eq!(names.last(), Some(&"GameCompleted"));
    assert_eq!(names.iter().filter(|n| **n == "MoveMade").count(), 9);
}

#[tokio::test]
async fn test_service_unknown_session() {
    let service = local_service();
    let missing = SessionId::from("nope");

    assert!(matches!(service.get_session(&missing).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(service.simulate(&missing).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(service.delete_session(&missing).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_service_rejects_unregistered_strategy() {
    let simulator = Simulator::new(
        Arc::new(LocalGameEngine::new()),
        Arc::new(MoveGeneratorFactory::with_strategies([StrategyKind::Random])),
    );
    let service = SessionService::new(
        Arc::new(InMemorySessionRepository::new()),
        simulator,
        Arc::new(TracingSink),
    );

    let err = service.create_session(StrategyKind::Ai).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Strategy(StrategyError::UnsupportedStrategy(_))
    ));
    assert!(service.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_service_set_strategy_after_completion_is_rejected() {
    let service = local_service();
    let session = service.create_session(StrategyKind::Random).await.unwrap();
    service.set_strategy(session.id(), StrategyKind::Ai).await.unwrap();

    service.simulate(session.id()).await.unwrap();
    let err = service.set_strategy(session.id(), StrategyKind::Random).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Session(SessionError::InvalidSessionState(_))
    ));
    assert_eq!(
        service.get_session(session.id()).await.unwrap().strategy(),
        StrategyKind::Ai
    );
}

#[tokio::test]
async fn test_service_persists_failed_simulation() {
    let service = service_with(Arc::new(StalledEngine), Arc::new(TracingSink))
        .with_simulation_timeout(Duration::from_millis(30));
    let session = service.create_session(StrategyKind::Random).await.unwrap();

    let err = service.simulate(session.id()).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Session(SessionError::SimulationFailed {
            cause: SimulationError::Cancelled { .. },
            ..
        })
    ));

    let stored = service.get_session(session.id()).await.unwrap();
    assert_eq!(stored.status(), SessionStatus::Failed);
}

#[tokio::test]
async fn test_service_shutdown_cancels_simulation() {
    let shutdown = CancellationToken::new();
    let service = service_with(Arc::new(StalledEngine), Arc::new(TracingSink))
        .with_shutdown(shutdown.clone());
    let session = service.create_session(StrategyKind::Random).await.unwrap();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    assert!(service.simulate(session.id()).await.is_err());
    assert_eq!(
        service.get_session(session.id()).await.unwrap().status(),
        SessionStatus::Failed
    );
}

#[tokio::test]
async fn test_failed_session_can_simulate_again() {
    let simulator = Simulator::new(
        Arc::new(LocalGameEngine::new()),
        Arc::new(MoveGeneratorFactory::with_defaults()),
    );
    let mut session = Session::new(StrategyKind::Random);
    session.fail_simulation();

    simulator.simulate(&mut session).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);
    assert!(matches!(
        session.pending_events().last(),
        Some(SessionEvent::GameCompleted { .. })
    ));
}

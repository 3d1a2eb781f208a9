//! Tests for the HTTP game engine client against a live engine router.

use std::sync::Arc;
use std::time::Duration;
use strictly_sim::{
    EngineError, GameEngine, GameId, HttpGameEngine, LocalGameEngine, MoveGeneratorFactory, Player,
    Position, RemoteStatus, Session, SessionError, SessionStatus, SimulationError, Simulator,
    StrategyKind, engine_router, serve,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serves a fresh engine on an ephemeral port. Returns its base URL.
async fn spawn_engine(shutdown: CancellationToken) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, engine_router(LocalGameEngine::new()), shutdown));
    format!("http://{addr}")
}

#[tokio::test]
async fn test_remote_game_round_trip() {
    let shutdown = CancellationToken::new();
    let url = spawn_engine(shutdown.clone()).await;
    let engine = HttpGameEngine::new(&url, Duration::from_secs(5)).unwrap();

    let created = engine.create_game().await.unwrap();
    let state = engine.get_state(&created.game_id).await.unwrap();
    assert_eq!(state.status, RemoteStatus::InProgress);
    assert_eq!(state.current_player, Player::X);
    assert!(state.board().is_empty());

    let state = engine.make_move(&created.game_id, Position::CENTER).await.unwrap();
    assert_eq!(state.current_player, Player::O);
    assert_eq!(state.board().get_cell(Position::CENTER), Some(Player::X));
    assert!(state.last_move_at.is_some());

    shutdown.cancel();
}

#[tokio::test]
async fn test_remote_errors_are_mapped() {
    let shutdown = CancellationToken::new();
    let url = spawn_engine(shutdown.clone()).await;
    let engine = HttpGameEngine::new(&format!("{url}/"), Duration::from_secs(5)).unwrap();

    let missing = GameId::from("missing");
    assert_eq!(
        engine.get_state(&missing).await.unwrap_err(),
        EngineError::NotFound(missing.clone())
    );

    let created = engine.create_game().await.unwrap();
    engine.make_move(&created.game_id, Position::CENTER).await.unwrap();
    match engine.make_move(&created.game_id, Position::CENTER).await.unwrap_err() {
        EngineError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("occupied"), "{message}");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }

    shutdown.cancel();
}

#[tokio::test]
async fn test_unreachable_engine_is_transport_error() {
    let engine = HttpGameEngine::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(matches!(
        engine.create_game().await,
        Err(EngineError::Transport(_))
    ));
}

#[tokio::test]
async fn test_simulation_over_http() {
    let shutdown = CancellationToken::new();
    let url = spawn_engine(shutdown.clone()).await;
    let simulator = Simulator::new(
        Arc::new(HttpGameEngine::new(&url, Duration::from_secs(5)).unwrap()),
        Arc::new(MoveGeneratorFactory::with_defaults()),
    );

    let mut session = Session::new(StrategyKind::RuleBased);
    simulator.simulate(&mut session).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);
    assert!(session.result().is_some());

    shutdown.cancel();
}

#[tokio::test]
async fn test_simulation_against_dead_engine_fails() {
    let simulator = Simulator::new(
        Arc::new(HttpGameEngine::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap()),
        Arc::new(MoveGeneratorFactory::with_defaults()),
    );
    let mut session = Session::new(StrategyKind::Random);

    let err = simulator.simulate(&mut session).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::SimulationFailed {
            cause: SimulationError::Engine(EngineError::Transport(_)),
            ..
        }
    ));
    assert_eq!(session.status(), SessionStatus::Failed);
}

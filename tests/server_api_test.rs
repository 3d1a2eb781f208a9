//! Tests for the HTTP API.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use strictly_sim::{
    AppState, InMemorySessionRepository, LocalGameEngine, MoveGeneratorFactory, SessionService,
    Simulator, StrategyKind, TracingSink, engine_router, router,
};
use tower::ServiceExt;

fn app() -> Router {
    let engine = LocalGameEngine::new();
    let simulator = Simulator::new(
        Arc::new(engine.clone()),
        Arc::new(MoveGeneratorFactory::with_strategies([
            StrategyKind::Random,
            StrategyKind::RuleBased,
        ])),
    );
    let sessions = SessionService::new(
        Arc::new(InMemorySessionRepository::new()),
        simulator,
        Arc::new(TracingSink),
    );
    router(AppState::new(engine, sessions, StrategyKind::RuleBased))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_game_flow() {
    let app = app();
    let (status, created) = send(&app, Method::POST, "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["gameId"].as_str().unwrap().to_string();

    let (status, state) = send(
        &app,
        Method::POST,
        &format!("/api/games/{id}/moves"),
        Some(json!({ "row": 1, "col": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["status"], "InProgress");
    assert_eq!(state["currentPlayer"], "O");
    assert_eq!(state["board"][1][1], "X");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/games/{id}/moves"),
        Some(json!({ "row": 1, "col": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, games) = send(&app, Method::GET, "/api/games", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(games.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn test_move_out_of_range_is_bad_request() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/games", None).await;
    let id = created["gameId"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/games/{id}/moves"),
        Some(json!({ "row": 0, "col": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_request() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/games", None).await;
    let game_id = created["gameId"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/games/{game_id}/moves"),
        Some(json!({ "row": -1, "col": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid request body"));

    let (_, session) = send(&app, Method::POST, "/api/sessions", None).await;
    let session_id = session["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/sessions/{session_id}/strategy"),
        Some(json!({ "strat": "ai" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("strategy"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(json!({ "strategy": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_session_create_simulate_get() {
    let app = app();
    let (status, session) = send(&app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["status"], "Created");
    assert_eq!(session["strategy"], "rule_based");
    let id = session["id"].as_str().unwrap().to_string();

    let uri = format!("/api/sessions/{id}/simulate");
    let (status, played) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(played["status"], "Completed");
    assert!(played["moves"].as_array().unwrap().len() >= 5);
    assert!(played["result"] == "Win" || played["result"] == "Draw");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "Completed");

    // The game the session played lives in the same engine.
    let game_id = fetched["currentGameId"].as_str().unwrap();
    let (status, game) = send(&app, Method::GET, &format!("/api/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(game["status"], "InProgress");
}

#[tokio::test]
async fn test_session_with_explicit_strategy() {
    let app = app();
    let (status, session) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(json!({ "strategy": "random" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["strategy"], "random");
}

#[tokio::test]
async fn test_session_unknown_or_disabled_strategy() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(json!({ "strategy": "grandmaster" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("grandmaster"));

    let body = Some(json!({ "strategy": "ai" }));
    let (status, _) = send(&app, Method::POST, "/api/sessions", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_strategy_change_rules() {
    let app = app();
    let (_, session) = send(&app, Method::POST, "/api/sessions", None).await;
    let id = session["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/sessions/{id}/strategy"),
        Some(json!({ "strategy": "random" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["strategy"], "random");

    send(&app, Method::POST, &format!("/api/sessions/{id}/simulate"), None).await;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/sessions/{id}/strategy"),
        Some(json!({ "strategy": "rule_based" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid session state"));
}

#[tokio::test]
async fn test_session_not_found() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/api/sessions/missing"),
        (Method::DELETE, "/api/sessions/missing"),
        (Method::POST, "/api/sessions/missing/simulate"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("missing"));
    }
}

#[tokio::test]
async fn test_session_list_and_delete() {
    let app = app();
    send(&app, Method::POST, "/api/sessions", None).await;
    let (_, second) = send(&app, Method::POST, "/api/sessions", None).await;

    let (status, all) = send(&app, Method::GET, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let id = second["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, all) = send(&app, Method::GET, "/api/sessions", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_strategies_lists_enabled() {
    let (status, body) = send(&app(), Method::GET, "/api/strategies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategies"], json!(["random", "rule_based"]));
    assert_eq!(body["defaultStrategy"], "rule_based");
}

#[tokio::test]
async fn test_engine_router_serves_games_only() {
    let app = engine_router(LocalGameEngine::new());
    let (status, _) = send(&app, Method::POST, "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::GET, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

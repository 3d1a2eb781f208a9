//! HTTP API.
//!
//! Two groups of routes share one router: the in-process game engine under
//! `/api/games` and session orchestration under `/api/sessions`.

mod error;
mod games;
mod sessions;

pub use error::{ApiError, ErrorBody};
pub use sessions::{CreateSessionRequest, SetStrategyRequest, StrategiesResponse};

use crate::engine::LocalGameEngine;
use crate::session::SessionService;
use crate::strategy::StrategyKind;
use axum::Router;
use axum::body::Body;
use axum::extract::FromRef;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::{Json, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    engine: LocalGameEngine,
    sessions: SessionService,
    default_strategy: StrategyKind,
}

impl AppState {
    /// Bundles the engine and session service behind the API.
    pub fn new(
        engine: LocalGameEngine,
        sessions: SessionService,
        default_strategy: StrategyKind,
    ) -> Self {
        Self {
            engine,
            sessions,
            default_strategy,
        }
    }
}

impl FromRef<AppState> for LocalGameEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

/// Game engine routes, usable under any state that can hand out the engine.
fn engine_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    LocalGameEngine: FromRef<S>,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/games", post(games::create_game).get(games::list_games))
        .route("/api/games/{id}", get(games::get_game).delete(games::delete_game))
        .route("/api/games/{id}/moves", post(games::make_move))
}

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    engine_routes()
        .route("/api/sessions", post(sessions::create_session).get(sessions::list_sessions))
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/{id}/strategy", put(sessions::set_strategy))
        .route("/api/sessions/{id}/simulate", post(sessions::simulate))
        .route("/api/strategies", get(sessions::strategies))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Router exposing only the game engine routes.
pub fn engine_router(engine: LocalGameEngine) -> Router {
    engine_routes()
        .layer(middleware::from_fn(log_request))
        .with_state(engine)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, "Incoming HTTP request");
    let response = next.run(req).await;
    info!(%method, %uri, status = %response.status(), "HTTP request completed");
    response
}

/// Serves `app` on `listener` until `shutdown` is cancelled.
#[instrument(skip(listener, app, shutdown))]
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Server stopped");
    Ok(())
}

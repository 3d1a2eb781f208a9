//! Session routes.

use super::AppState;
use super::error::ApiError;
use crate::session::{Session, SessionId};
use crate::strategy::{StrategyError, StrategyKind};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

/// Body of `POST /api/sessions`. An empty body uses the default strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Strategy id such as `"rule_based"`.
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Body of `PUT /api/sessions/{id}/strategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStrategyRequest {
    /// Strategy id.
    pub strategy: String,
}

/// Body of `GET /api/strategies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategiesResponse {
    /// Enabled strategies.
    pub strategies: Vec<StrategyKind>,
    /// Strategy used when a request names none.
    pub default_strategy: StrategyKind,
}

fn parse_strategy(id: &str) -> Result<StrategyKind, ApiError> {
    StrategyKind::from_str(id.trim())
        .map_err(|_| StrategyError::UnsupportedStrategy(id.to_string()).into())
}

#[instrument(skip(state, body))]
pub(super) async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let request: CreateSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let strategy = match request.strategy.as_deref() {
        Some(id) => parse_strategy(id)?,
        None => state.default_strategy,
    };
    debug!(%strategy, "Creating session");
    let session = state.sessions.create_session(strategy).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(state))]
pub(super) async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Session>>, ApiError> {
    Ok(Json(state.sessions.list_sessions().await?))
}

#[instrument(skip(state))]
pub(super) async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions.get_session(&SessionId::from(id)).await?))
}

#[instrument(skip(state))]
pub(super) async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.delete_session(&SessionId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub(super) async fn set_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SetStrategyRequest>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(request) = body?;
    let strategy = parse_strategy(&request.strategy)?;
    Ok(Json(state.sessions.set_strategy(&SessionId::from(id), strategy).await?))
}

#[instrument(skip(state))]
pub(super) async fn simulate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions.simulate(&SessionId::from(id)).await?))
}

#[instrument(skip(state))]
pub(super) async fn strategies(State(state): State<AppState>) -> Json<StrategiesResponse> {
    Json(StrategiesResponse {
        strategies: state.sessions.strategies().into_iter().collect(),
        default_strategy: state.default_strategy,
    })
}

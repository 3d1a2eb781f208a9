//! Game engine routes.

use super::error::ApiError;
use crate::engine::{CreatedGame, EngineError, GameStateView, LocalGameEngine};
use crate::games::tictactoe::{GameError, GameId, Position, RawPosition};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

#[instrument(skip(engine))]
pub(super) async fn create_game(
    State(engine): State<LocalGameEngine>,
) -> Result<(StatusCode, Json<CreatedGame>), ApiError> {
    let created = engine.create()?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(engine))]
pub(super) async fn list_games(
    State(engine): State<LocalGameEngine>,
) -> Result<Json<Vec<GameStateView>>, ApiError> {
    Ok(Json(engine.list_games()?))
}

#[instrument(skip(engine))]
pub(super) async fn get_game(
    State(engine): State<LocalGameEngine>,
    Path(id): Path<String>,
) -> Result<Json<GameStateView>, ApiError> {
    Ok(Json(engine.state(&GameId::from(id))?))
}

#[instrument(skip(engine, body))]
pub(super) async fn make_move(
    State(engine): State<LocalGameEngine>,
    Path(id): Path<String>,
    body: Result<Json<RawPosition>, JsonRejection>,
) -> Result<Json<GameStateView>, ApiError> {
    let Json(raw) = body?;
    let position = Position::try_from(raw).map_err(|e| EngineError::from(GameError::from(e)))?;
    Ok(Json(engine.apply_move(&GameId::from(id), position)?))
}

#[instrument(skip(engine))]
pub(super) async fn delete_game(
    State(engine): State<LocalGameEngine>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = GameId::from(id);
    if engine.delete_game(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(EngineError::NotFound(id).into())
    }
}

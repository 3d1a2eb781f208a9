//! In-process game engine.

use super::{CreatedGame, EngineError, GameEngine, GameStateView};
use crate::games::tictactoe::{Game, GameId, Position};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Authoritative store of games, shared across handlers.
#[derive(Debug, Clone, Default)]
pub struct LocalGameEngine {
    games: Arc<Mutex<HashMap<GameId, Game>>>,
}

impl LocalGameEngine {
    /// Creates an empty engine.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating local game engine");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<GameId, Game>>, EngineError> {
        self.games
            .lock()
            .map_err(|_| EngineError::Unavailable("game store lock poisoned".to_string()))
    }

    /// Creates and stores a new game.
    #[instrument(skip(self))]
    pub fn create(&self) -> Result<CreatedGame, EngineError> {
        let game = Game::new();
        let created = CreatedGame::new(game.id().clone(), game.created_at());
        self.lock()?.insert(game.id().clone(), game);
        info!(game_id = %created.game_id, "Game created");
        Ok(created)
    }

    /// Applies a move for the player to move.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub fn apply_move(
        &self,
        game_id: &GameId,
        position: Position,
    ) -> Result<GameStateView, EngineError> {
        let mut games = self.lock()?;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| EngineError::NotFound(game_id.clone()))?;

        let player = game.current_player();
        game.make_move(position, player).map_err(|e| {
            warn!(error = %e, %position, "Move rejected");
            EngineError::from(e)
        })?;

        debug!(%position, %player, status = ?game.status(), "Move applied");
        Ok(GameStateView::from_game(game))
    }

    /// Returns the state of one game.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub fn state(&self, game_id: &GameId) -> Result<GameStateView, EngineError> {
        self.lock()?
            .get(game_id)
            .map(GameStateView::from_game)
            .ok_or_else(|| EngineError::NotFound(game_id.clone()))
    }

    /// Returns every game, oldest first.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameStateView>, EngineError> {
        let mut views: Vec<_> = self.lock()?.values().map(GameStateView::from_game).collect();
        views.sort_by_key(|v| v.created_at);
        debug!(count = views.len(), "Listed games");
        Ok(views)
    }

    /// Removes a game. Returns true if it existed.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub fn delete_game(&self, game_id: &GameId) -> Result<bool, EngineError> {
        let removed = self.lock()?.remove(game_id).is_some();
        info!(removed, "Game deleted");
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl GameEngine for LocalGameEngine {
    async fn create_game(&self) -> Result<CreatedGame, EngineError> {
        self.create()
    }

    async fn make_move(
        &self,
        game_id: &GameId,
        position: Position,
    ) -> Result<GameStateView, EngineError> {
        self.apply_move(game_id, position)
    }

    async fn get_state(&self, game_id: &GameId) -> Result<GameStateView, EngineError> {
        self.state(game_id)
    }
}

//! HTTP client for a remote game engine.

use super::{CreatedGame, EngineError, GameEngine, GameStateView};
use crate::games::tictactoe::{GameId, Position, RawPosition};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Talks to the engine API served under `{base_url}/api/games`.
#[derive(Debug, Clone)]
pub struct HttpGameEngine {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGameEngine {
    /// Creates a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Transport`] if the HTTP client cannot be built.
    #[instrument(skip_all, fields(base_url = %base_url))]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL of the engine.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn games_url(&self) -> String {
        format!("{}/api/games", self.base_url)
    }

    /// Turns a response into `T`, mapping failure statuses onto [`EngineError`].
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        game_id: Option<&GameId>,
    ) -> Result<T, EngineError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND
            && let Some(id) = game_id
        {
            warn!(game_id = %id, "Engine reports game not found");
            return Err(EngineError::NotFound(id.clone()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or(body);
            warn!(status = %status, message = %message, "Engine rejected request");
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to decode engine response");
            EngineError::Decode(e.to_string())
        })
    }
}

fn transport(err: reqwest::Error) -> EngineError {
    error!(error = %err, "Engine request failed");
    EngineError::Transport(err.to_string())
}

#[async_trait::async_trait]
impl GameEngine for HttpGameEngine {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn create_game(&self) -> Result<CreatedGame, EngineError> {
        debug!("Creating remote game");
        let response = self.client.post(self.games_url()).send().await.map_err(transport)?;
        Self::decode(response, None).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url, game_id = %game_id))]
    async fn make_move(
        &self,
        game_id: &GameId,
        position: Position,
    ) -> Result<GameStateView, EngineError> {
        debug!(%position, "Submitting move");
        let url = format!("{}/{}/moves", self.games_url(), game_id);
        let response = self
            .client
            .post(url)
            .json(&RawPosition::from(position))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response, Some(game_id)).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url, game_id = %game_id))]
    async fn get_state(&self, game_id: &GameId) -> Result<GameStateView, EngineError> {
        debug!("Polling remote state");
        let url = format!("{}/{}", self.games_url(), game_id);
        let response = self.client.get(url).send().await.map_err(transport)?;
        Self::decode(response, Some(game_id)).await
    }
}

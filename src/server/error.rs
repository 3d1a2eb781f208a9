//! Mapping of domain errors to HTTP responses.

use crate::engine::EngineError;
use crate::session::{ServiceError, SessionError, SimulationError};
use crate::strategy::StrategyError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON error body: `{ "error": "<message>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Error returned by API handlers.
#[derive(Debug, Clone, derive_more::Display, derive_more::From)]
pub enum ApiError {
    /// Game engine failure.
    #[display("{_0}")]
    Engine(EngineError),
    /// Session service failure.
    #[display("{_0}")]
    Service(ServiceError),
    /// Malformed request.
    #[display("{_0}")]
    #[from(ignore)]
    BadRequest(String),
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<StrategyError> for ApiError {
    fn from(err: StrategyError) -> Self {
        ApiError::Service(ServiceError::Strategy(err))
    }
}

fn engine_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Rule(_) => StatusCode::BAD_REQUEST,
        EngineError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Rejected { .. } | EngineError::Transport(_) | EngineError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(err) => engine_status(err),
            ApiError::Service(err) => match err {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Strategy(StrategyError::UnsupportedStrategy(_)) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Strategy(StrategyError::NoLegalMove) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Session(SessionError::InvalidSessionState(_)) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Session(SessionError::SimulationFailed { cause, .. }) => {
                    match cause {
                        SimulationError::Engine(_) | SimulationError::TimedOut { .. } => {
                            StatusCode::BAD_GATEWAY
                        }
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    }
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "Request failed");
        } else {
            warn!(%status, error = %self, "Request rejected");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

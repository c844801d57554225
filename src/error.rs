//! HTTP-facing error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::logbook::{CycleError, SimulationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input format. Expected numeric values.")]
    MalformedRequest(String),

    #[error("Invalid input values. {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Logbook generation failed")]
    Simulation(String),
}

impl From<SimulationError> for AppError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::InvalidInput(msg) => Self::InvalidInput(msg),
            SimulationError::InvariantViolation(msg) => Self::Simulation(msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) | Self::InvalidInput(_) | Self::Cycle(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Simulation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Simulation(detail) => tracing::error!("Logbook simulation failed: {}", detail),
            Self::MalformedRequest(detail) => tracing::debug!("Rejected request body: {}", detail),
            _ => tracing::debug!("Rejected trip: {}", self),
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "logbooks": [],
        }));
        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

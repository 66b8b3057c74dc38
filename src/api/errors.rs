use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::contracts::types::ContractError;

/// The failure envelope every endpoint shares.
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Client input errors, detected before delegation (4xx).
    BadRequest(String),
    /// Unmapped route.
    NotFound(String),
    /// Uncaught server fault.
    Internal(String),
    /// Contract-access layer failure.
    Contract(ContractError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Handled operation failures keep the 200 envelope the frontend
            // already expects; the success flag carries the outcome.
            ApiError::Contract(_) => StatusCode::OK,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::NotFound(message) => message.clone(),
            ApiError::Internal(message) => message.clone(),
            ApiError::Contract(error) => error.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = FailureResponse {
            success: false,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ContractError> for ApiError {
    fn from(error: ContractError) -> Self {
        ApiError::Contract(error)
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

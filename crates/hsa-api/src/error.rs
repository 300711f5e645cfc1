//! Error types (hsa-api)

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::handlers::ErrorResponse;

/// hsa-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not a JSON object of the expected shape
    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Core(#[from] hsa_core::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidBody(rejection) => warn!("Error parsing request body: {}", rejection.body_text()),
            Self::Core(e) => error!("Error generating Gemini response: {}", e),
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_are_server_errors() {
        let err = ApiError::from(hsa_core::Error::NoCandidates);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "no valid candidates found in response");
    }
}

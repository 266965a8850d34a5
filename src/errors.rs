// Search Service Error Types
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding input too long: {0}")]
    EmbeddingTooLong(String),

    #[error("Search service error: {0}")]
    SearchUpstream(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingUpstream(String),

    #[error("URL signing failed: {0}")]
    Signing(String),

    #[error("Template rendering failed: {0}")]
    Render(#[from] tera::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// Stable machine-readable kind carried in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::EmbeddingTooLong(_) => "embedding_input_too_long",
            ApiError::SearchUpstream(_) => "search_upstream",
            ApiError::EmbeddingUpstream(_) => "embedding_upstream",
            ApiError::Signing(_) => "signing",
            ApiError::Render(_) => "render",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_)
            | ApiError::InvalidInput(_)
            | ApiError::EmbeddingTooLong(_) => StatusCode::BAD_REQUEST,
            ApiError::SearchUpstream(_) | ApiError::EmbeddingUpstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Signing(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Log every failure before it is surfaced; downstream faults at
        // error level, caller mistakes at warn.
        if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), "{}", self);
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), "{}", self);
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        })
    }
}

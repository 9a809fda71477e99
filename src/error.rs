//! Error types for the daily progress engine.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed submission payload. Nothing is persisted.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// The user's history changed between the recomputation read and the
    /// aggregate write. The caller should retry the whole submission.
    #[error("history changed during recomputation for user {user_id}, retry the submission")]
    Conflict { user_id: String },

    /// A fixed code referenced by the engine configuration is missing or
    /// inactive in the catalog. Fatal at startup.
    #[error("catalog configuration error: {0}")]
    Configuration(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("stale history snapshot for user {user_id} (expected version {expected}, found {found})")]
    StaleSnapshot {
        user_id: String,
        expected: u64,
        found: u64,
    },
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::Conflict { .. } => StatusCode::CONFLICT,
            EngineError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
        }))
    }
}

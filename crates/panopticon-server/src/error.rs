use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use panopticon_core::{
    classify::ServerKind,
    error::{DecodeError, IngestError, PersistError},
};

/// Application-level errors that map directly to HTTP responses.
///
/// Senders only ever see a generic message; the cause goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error decoding JSON")]
    Decode(#[from] DecodeError),

    #[error("Error saving to DB")]
    Persist {
        kind: ServerKind,
        #[source]
        source: PersistError,
    },
}

impl AppError {
    /// Attach the sender kind a failed ingest was classified as.
    pub fn from_ingest(kind: ServerKind, err: IngestError) -> Self {
        match err {
            IngestError::Decode(e) => AppError::Decode(e),
            IngestError::Persist(source) => AppError::Persist { kind, source },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Decode(e) => {
                tracing::warn!(error = %e, "Error decoding JSON");
                StatusCode::BAD_REQUEST
            }
            AppError::Persist { kind, source } => {
                tracing::error!(kind = %kind, table = kind.table(), error = %source, "Error saving to DB");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(json!({ "error_message": "unable to process request" })),
        )
            .into_response()
    }
}

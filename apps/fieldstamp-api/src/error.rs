//! Error types for the Fieldstamp API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use fieldstamp_pdf::PdfError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("PDF processing error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self {
            ApiError::Pdf(e) => {
                tracing::error!("PDF processing error: {}", e);
                e.to_string()
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                e.to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                e.to_string()
            }
        };

        let body = Json(json!({
            "error": "Failed to process PDF",
            "details": details,
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

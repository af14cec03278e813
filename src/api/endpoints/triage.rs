//! Triage endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::triage::{TriageInput, TriageResult};

/// `POST /triage` — classify a complaint with history and vitals.
///
/// Malformed payloads and blank complaints are rejected with 400. Once the
/// provider answers, the result always conforms to the triage contract.
pub async fn classify(
    State(ctx): State<ApiContext>,
    payload: Result<Json<TriageInput>, JsonRejection>,
) -> Result<Json<TriageResult>, ApiError> {
    let Json(input) = payload?;

    if input.complaint.trim().is_empty() {
        return Err(ApiError::BadRequest("Complaint cannot be empty".into()));
    }

    let result = ctx.pipeline.triage(&input).await?;
    Ok(Json(result))
}

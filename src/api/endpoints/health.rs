//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(rename = "modelUri")]
    pub model_uri: String,
    pub version: &'static str,
}

/// `GET /health` — liveness plus the configured model.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_uri: ctx.client().model_uri().to_string(),
        version: crate::config::APP_VERSION,
    })
}

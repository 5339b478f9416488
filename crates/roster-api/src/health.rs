//! Handler for `GET /health/healthz`.

use std::sync::Arc;

use axum::{Json, extract::State};
use roster_core::store::PersonStore;
use serde_json::{Value, json};

use crate::error::ApiError;

/// `GET /health/healthz` — 200 when the store answers, 503 otherwise.
pub async fn healthz<S>(State(store): State<Arc<S>>) -> Result<Json<Value>, ApiError>
where
  S: PersonStore,
{
  store
    .ping()
    .await
    .map_err(|e| ApiError::Unavailable(format!("health check failed: {e}")))?;
  Ok(Json(json!({ "status": "healthy" })))
}

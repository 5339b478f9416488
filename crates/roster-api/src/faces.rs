//! Read-only handlers for `/faces` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/faces/` | `?page_number=` (from 1) and `?page_length=` (default 10) |
//! | `GET`  | `/faces/{face_id}` | 404 if not found |

use std::sync::Arc;

use axum::extract::State;
use roster_core::{face::Face, store::PersonStore};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

pub const DEFAULT_PAGE_LENGTH: usize = 10;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
  pub page_number: Option<usize>,
  pub page_length: Option<usize>,
}

/// `GET /faces/[?page_number=...][&page_length=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Face>>, ApiError>
where
  S: PersonStore,
{
  let page_number = params.page_number.unwrap_or(1);
  let page_length = params.page_length.unwrap_or(DEFAULT_PAGE_LENGTH);
  if page_number == 0 || page_length == 0 {
    return Err(ApiError::Unprocessable(
      "page_number and page_length must be at least 1".into(),
    ));
  }

  let offset = (page_number - 1).saturating_mul(page_length);
  let faces = store
    .list_faces(offset, page_length)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(faces))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /faces/{face_id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(face_id): Path<String>,
) -> Result<Json<Face>, ApiError>
where
  S: PersonStore,
{
  let face = store.get_face(&face_id).await.map_err(ApiError::from_store)?;
  Ok(Json(face))
}

//! Handler for `GET /matches/{id}/persons`.

use std::sync::Arc;

use axum::extract::State;
use roster_core::{person::Person, store::PersonStore};

use crate::{
  error::ApiError,
  extract::{Json, Path},
};

/// `GET /matches/{id}/persons` — current members only; `[]` for an unknown
/// match.
pub async fn persons<S>(
  State(store): State<Arc<S>>,
  Path(match_id): Path<String>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
{
  let persons = store
    .list_persons_for_match(&match_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(persons))
}

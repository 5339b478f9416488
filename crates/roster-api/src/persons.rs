//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons/` | Optional `?name=` filter, `?offset=` and `?limit=` |
//! | `POST`   | `/persons/` | Body: [`NewPerson`]; returns 201 + stored person |
//! | `GET`    | `/persons/{id}` | 404 if not found |
//! | `PUT`    | `/persons/{id}` | Body: [`PersonPatch`]; absent fields are kept |
//! | `DELETE` | `/persons/{id}` | 204; history is retained |
//! | `GET`    | `/persons/{id}/faces` | `[]` when the person has no faces |
//! | `GET`    | `/persons/{id}/history` | Oldest version first; works after delete |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use roster_core::{
  face::Face,
  history::PersonHistoryEntry,
  person::{NewPerson, Person, PersonPatch},
  store::PersonStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive substring filter on the name.
  pub name:   Option<String>,
  pub offset: Option<usize>,
  pub limit:  Option<usize>,
}

/// `GET /persons/[?name=...][&offset=...][&limit=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
{
  let persons = match params.name.as_deref() {
    Some(fragment) => store.search_persons(fragment).await,
    None => store.list_persons().await,
  }
  .map_err(ApiError::from_store)?;

  let page = persons
    .into_iter()
    .skip(params.offset.unwrap_or(0))
    .take(params.limit.unwrap_or(usize::MAX))
    .collect();
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let person = store.get_person(id).await.map_err(ApiError::from_store)?;
  Ok(Json(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons/` — returns 201 + the stored [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let person = store.create_person(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /persons/{id}` — returns the updated [`Person`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let person = store
    .update_person(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/{id}` — 204 on success.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
{
  store.delete_person(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Associations ─────────────────────────────────────────────────────────────

/// `GET /persons/{id}/faces`
pub async fn faces<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Face>>, ApiError>
where
  S: PersonStore,
{
  let faces = store
    .list_faces_for_person(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(faces))
}

/// `GET /persons/{id}/history`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PersonHistoryEntry>>, ApiError>
where
  S: PersonStore,
{
  let history = store.get_history(id).await.map_err(ApiError::from_store)?;
  Ok(Json(history))
}

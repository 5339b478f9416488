//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::PersonStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = roster_api::api_router(Arc::new(store));
//! ```

pub mod error;
pub mod extract;
pub mod faces;
pub mod health;
pub mod matches;
pub mod persons;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::store::PersonStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .put(persons::update::<S>)
        .delete(persons::delete::<S>),
    )
    .route("/persons/{id}/faces", get(persons::faces::<S>))
    .route("/persons/{id}/history", get(persons::history::<S>))
    // Faces
    .route("/faces", get(faces::list::<S>))
    .route("/faces/", get(faces::list::<S>))
    .route("/faces/{face_id}", get(faces::get_one::<S>))
    // Matches
    .route("/matches/{id}/persons", get(matches::persons::<S>))
    // Health
    .route("/health/healthz", get(health::healthz::<S>))
    .with_state(store)
}

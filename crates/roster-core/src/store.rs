//! The `PersonStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error,
  face::Face,
  history::PersonHistoryEntry,
  person::{NewPerson, Person, PersonPatch},
};

// ─── Error classification ────────────────────────────────────────────────────

/// Implemented by backend error types so callers can tell domain failures
/// (not found, invalid input) apart from storage failures without knowing the
/// concrete backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error carried by this error, or `None` for a storage failure.
  fn as_core(&self) -> Option<&Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a person store backend.
///
/// Every mutation writes the current row and appends exactly one history
/// entry as a single atomic unit. History is never rewritten.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  // ── Current rows ──────────────────────────────────────────────────────

  /// All current persons, ordered by id.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Current persons whose name contains `fragment` (case-insensitive),
  /// ordered by id.
  fn search_persons<'a>(
    &'a self,
    fragment: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Fails with [`Error::PersonNotFound`] if `id` has no current row.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  // ── Versioned writes ──────────────────────────────────────────────────

  /// Validate `input`, allocate a fresh id and record version 1.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Apply `patch` to the current row and record the next version.
  fn update_person(
    &self,
    id: Uuid,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Remove the current row and record a tombstone version.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// All versions of `id`, oldest first. Works after deletion; fails with
  /// [`Error::HistoryNotFound`] only if `id` never existed.
  fn get_history(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<PersonHistoryEntry>, Self::Error>> + Send + '_;

  // ── Associations ──────────────────────────────────────────────────────

  /// Faces assigned to `id`. Empty if there are none or `id` is unknown.
  fn list_faces_for_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Face>, Self::Error>> + Send + '_;

  /// Fails with [`Error::FaceNotFound`] if no face has id `face_id`.
  fn get_face<'a>(
    &'a self,
    face_id: &'a str,
  ) -> impl Future<Output = Result<Face, Self::Error>> + Send + 'a;

  /// One page of all faces, ordered by face id.
  fn list_faces(
    &self,
    offset: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Face>, Self::Error>> + Send + '_;

  /// Current persons that are members of `match_id`. Deleted members are
  /// skipped; an unknown match yields an empty list.
  fn list_persons_for_match<'a>(
    &'a self,
    match_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Health ────────────────────────────────────────────────────────────

  /// Round-trip to the backend without touching any data.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

//! Error types for `roster-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("no history recorded for person {0}")]
  HistoryNotFound(Uuid),

  #[error("face not found: {0}")]
  FaceNotFound(String),

  #[error("invalid person: {0}")]
  Validation(String),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::PersonNotFound(_) | Self::HistoryNotFound(_) | Self::FaceNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

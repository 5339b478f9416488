//! Person — the identity record managed by the store.
//!
//! A person has exactly one current row. Every change to that row is also
//! snapshotted into the append-only history (see [`crate::history`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Upper bound on the length of a person's name, in characters.
pub const MAX_NAME_CHARS: usize = 256;

/// Free-form key/value attributes attached to a person.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ─── Person ──────────────────────────────────────────────────────────────────

/// The current state of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  /// Assigned by the store at creation and never reused.
  pub id:         Uuid,
  pub name:       String,
  #[serde(default)]
  pub metadata:   Metadata,
  pub created_at: DateTime<Utc>,
  /// Never moves backwards across updates of the same person.
  pub updated_at: DateTime<Utc>,
}

impl Person {
  /// Apply `patch` on top of this person. Only the supplied fields change;
  /// timestamps are left to the caller.
  pub fn apply(&mut self, patch: PersonPatch) {
    if let Some(name) = patch.name {
      self.name = name.trim().to_owned();
    }
    if let Some(metadata) = patch.metadata {
      self.metadata = metadata;
    }
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::PersonStore::create_person`].
/// `id` and both timestamps are always set by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:     String,
  #[serde(default)]
  pub metadata: Metadata,
}

impl NewPerson {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), metadata: Metadata::new() }
  }

  pub fn with_metadata(mut self, metadata: Metadata) -> Self {
    self.metadata = metadata;
    self
  }

  /// Check the input and normalise the name (surrounding whitespace is
  /// dropped).
  pub fn validate(mut self) -> Result<Self> {
    self.name = validate_name(&self.name)?;
    validate_metadata(&self.metadata)?;
    Ok(self)
  }
}

// ─── PersonPatch ─────────────────────────────────────────────────────────────

/// Partial update for [`crate::store::PersonStore::update_person`].
///
/// `None` leaves the attribute untouched; `Some` replaces it wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Metadata>,
}

impl PersonPatch {
  pub fn name(name: impl Into<String>) -> Self {
    Self { name: Some(name.into()), metadata: None }
  }

  pub fn metadata(metadata: Metadata) -> Self {
    Self { name: None, metadata: Some(metadata) }
  }

  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.metadata.is_none()
  }

  /// Validate only the fields that are present.
  pub fn validate(mut self) -> Result<Self> {
    if let Some(name) = &self.name {
      self.name = Some(validate_name(name)?);
    }
    if let Some(metadata) = &self.metadata {
      validate_metadata(metadata)?;
    }
    Ok(self)
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation("name must not be empty".into()));
  }
  let chars = trimmed.chars().count();
  if chars > MAX_NAME_CHARS {
    return Err(Error::Validation(format!(
      "name is {chars} characters long; the limit is {MAX_NAME_CHARS}"
    )));
  }
  Ok(trimmed.to_owned())
}

fn validate_metadata(metadata: &Metadata) -> Result<()> {
  if metadata.keys().any(|k| k.trim().is_empty()) {
    return Err(Error::Validation("metadata keys must not be empty".into()));
  }
  Ok(())
}

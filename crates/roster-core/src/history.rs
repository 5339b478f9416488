//! Version history for persons.
//!
//! History entries are immutable. The store appends one per create, update and
//! delete; the delete entry (the tombstone) snapshots the last state before
//! the current row was removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::{Metadata, Person};

/// What happened to the person at a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Created,
  Updated,
  Deleted,
}

/// A snapshot of a person at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonHistoryEntry {
  pub person_id:   Uuid,
  /// 1-based; strictly increasing per person.
  pub version:     u32,
  pub change:      ChangeKind,
  pub name:        String,
  pub metadata:    Metadata,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  /// Server-assigned; when the entry was appended.
  pub recorded_at: DateTime<Utc>,
}

impl PersonHistoryEntry {
  /// Snapshot `person` as it stands at `version`.
  pub fn snapshot(
    person: &Person,
    version: u32,
    change: ChangeKind,
    recorded_at: DateTime<Utc>,
  ) -> Self {
    Self {
      person_id: person.id,
      version,
      change,
      name: person.name.clone(),
      metadata: person.metadata.clone(),
      created_at: person.created_at,
      updated_at: person.updated_at,
      recorded_at,
    }
  }

  pub fn is_tombstone(&self) -> bool { self.change == ChangeKind::Deleted }
}

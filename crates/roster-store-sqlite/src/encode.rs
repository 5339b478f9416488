//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Metadata and bounding boxes
//! are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings, so ordering by the text column matches ordering by [`Uuid`].

use chrono::{DateTime, Utc};
use roster_core::{
  face::{BoundingBox, Face},
  history::{ChangeKind, PersonHistoryEntry},
  person::{Metadata, Person},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn encode_metadata(m: &Metadata) -> Result<String> {
  Ok(serde_json::to_string(m)?)
}

pub fn decode_metadata(s: &str) -> Result<Metadata> {
  Ok(serde_json::from_str(s)?)
}

// ─── ChangeKind ──────────────────────────────────────────────────────────────

pub fn encode_change(c: ChangeKind) -> &'static str {
  match c {
    ChangeKind::Created => "created",
    ChangeKind::Updated => "updated",
    ChangeKind::Deleted => "deleted",
  }
}

pub fn decode_change(s: &str) -> Result<ChangeKind> {
  match s {
    "created" => Ok(ChangeKind::Created),
    "updated" => Ok(ChangeKind::Updated),
    "deleted" => Ok(ChangeKind::Deleted),
    other => Err(Error::UnknownChangeKind(other.to_owned())),
  }
}

// ─── BoundingBox ─────────────────────────────────────────────────────────────

pub fn encode_bounding_box(b: &BoundingBox) -> Result<String> {
  Ok(serde_json::to_string(b)?)
}

pub fn decode_bounding_box(s: &str) -> Result<BoundingBox> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`]; `persons` is aliased `p` in
/// every query that uses it.
pub const PERSON_COLUMNS: &str =
  "p.person_id, p.name, p.metadata, p.created_at, p.updated_at";

/// Raw strings read directly from a `persons` row. Also used to carry an
/// encoded person into a write.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub metadata:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPerson {
  pub fn encode(p: &Person) -> Result<Self> {
    Ok(Self {
      person_id:  encode_uuid(p.id),
      name:       p.name.clone(),
      metadata:   encode_metadata(&p.metadata)?,
      created_at: encode_dt(p.created_at),
      updated_at: encode_dt(p.updated_at),
    })
  }

  /// Read a row whose leading columns follow [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      name:       row.get(1)?,
      metadata:   row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:         decode_uuid(&self.person_id)?,
      name:       self.name,
      metadata:   decode_metadata(&self.metadata)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `person_history` row.
pub struct RawHistoryEntry {
  pub person_id:   String,
  pub version:     u32,
  pub change:      String,
  pub name:        String,
  pub metadata:    String,
  pub created_at:  String,
  pub updated_at:  String,
  pub recorded_at: String,
}

impl RawHistoryEntry {
  pub fn encode(e: &PersonHistoryEntry) -> Result<Self> {
    Ok(Self {
      person_id:   encode_uuid(e.person_id),
      version:     e.version,
      change:      encode_change(e.change).to_owned(),
      name:        e.name.clone(),
      metadata:    encode_metadata(&e.metadata)?,
      created_at:  encode_dt(e.created_at),
      updated_at:  encode_dt(e.updated_at),
      recorded_at: encode_dt(e.recorded_at),
    })
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:   row.get(0)?,
      version:     row.get(1)?,
      change:      row.get(2)?,
      name:        row.get(3)?,
      metadata:    row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
      recorded_at: row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<PersonHistoryEntry> {
    Ok(PersonHistoryEntry {
      person_id:   decode_uuid(&self.person_id)?,
      version:     self.version,
      change:      decode_change(&self.change)?,
      name:        self.name,
      metadata:    decode_metadata(&self.metadata)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Column list matching [`RawFace::from_row`].
pub const FACE_COLUMNS: &str =
  "face_id, person_id, image_name, face_path, confidence, bounding_box";

/// Raw values read directly from a `faces` row.
pub struct RawFace {
  pub face_id:      String,
  pub person_id:    Option<String>,
  pub image_name:   String,
  pub face_path:    Option<String>,
  pub confidence:   Option<f64>,
  pub bounding_box: Option<String>,
}

impl RawFace {
  pub fn encode(f: &Face) -> Result<Self> {
    Ok(Self {
      face_id:      f.face_id.clone(),
      person_id:    f.person_id.map(encode_uuid),
      image_name:   f.image_name.clone(),
      face_path:    f.face_path.clone(),
      confidence:   f.confidence,
      bounding_box: f
        .bounding_box
        .as_ref()
        .map(encode_bounding_box)
        .transpose()?,
    })
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      face_id:      row.get(0)?,
      person_id:    row.get(1)?,
      image_name:   row.get(2)?,
      face_path:    row.get(3)?,
      confidence:   row.get(4)?,
      bounding_box: row.get(5)?,
    })
  }

  pub fn into_face(self) -> Result<Face> {
    Ok(Face {
      face_id:      self.face_id,
      person_id:    self.person_id.as_deref().map(decode_uuid).transpose()?,
      image_name:   self.image_name,
      face_path:    self.face_path,
      confidence:   self.confidence,
      bounding_box: self
        .bounding_box
        .as_deref()
        .map(decode_bounding_box)
        .transpose()?,
    })
  }
}

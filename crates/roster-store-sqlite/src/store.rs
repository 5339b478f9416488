//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use roster_core::{
  face::Face,
  history::{ChangeKind, PersonHistoryEntry},
  person::{NewPerson, Person, PersonPatch},
  store::PersonStore,
};

use crate::{
  encode::{
    encode_uuid, RawFace, RawHistoryEntry, RawPerson, FACE_COLUMNS, PERSON_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection handle is reference-counted and
/// all statements run on its dedicated database thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Wrap an already-open connection and run schema initialisation.
  pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::new(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::new(conn).await
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Select [`PERSON_COLUMNS`] from `persons p` followed by `tail` (joins,
  /// filters, ordering) and decode every row.
  async fn query_persons(
    &self,
    tail: &'static str,
    param: Option<String>,
  ) -> Result<Vec<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons p {tail}");

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt.query_map(rusqlite::params![p], RawPerson::from_row)?,
          None => stmt.query_map([], RawPerson::from_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  // ── Current rows ──────────────────────────────────────────────────────────

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let persons = self.query_persons("ORDER BY p.person_id", None).await?;
    debug!(count = persons.len(), "listed persons");
    Ok(persons)
  }

  async fn search_persons<'a>(&'a self, fragment: &'a str) -> Result<Vec<Person>> {
    // SQLite's LIKE and lower() only fold ASCII, so matching happens here.
    let needle = fragment.to_lowercase();
    let mut persons = self.list_persons().await?;
    persons.retain(|p| p.name.to_lowercase().contains(&needle));
    debug!(count = persons.len(), "searched persons");
    Ok(persons)
  }

  async fn get_person(&self, id: Uuid) -> Result<Person> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| Ok(select_person(conn, &id_str)?))
      .await?;

    raw
      .ok_or(roster_core::Error::PersonNotFound(id))?
      .into_person()
  }

  // ── Versioned writes ──────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let input = input.validate()?;

    let now = Utc::now();
    let person = Person {
      id:         Uuid::new_v4(),
      name:       input.name,
      metadata:   input.metadata,
      created_at: now,
      updated_at: now,
    };
    let entry = PersonHistoryEntry::snapshot(&person, 1, ChangeKind::Created, now);

    let row     = RawPerson::encode(&person)?;
    let history = RawHistoryEntry::encode(&entry)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_person(&tx, &row)?;
        append_history(&tx, &history)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    info!(person_id = %person.id, version = 1, "person created");
    Ok(person)
  }

  async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person> {
    let patch = patch.validate()?;
    let now = Utc::now();

    let (person, version) = self
      .conn
      .call(move |conn| Ok(update_in_tx(conn, id, patch, now)))
      .await??
      .ok_or(roster_core::Error::PersonNotFound(id))?;

    info!(person_id = %id, version, "person updated");
    Ok(person)
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    let now = Utc::now();

    let version = self
      .conn
      .call(move |conn| Ok(delete_in_tx(conn, id, now)))
      .await??
      .ok_or(roster_core::Error::PersonNotFound(id))?;

    info!(person_id = %id, version, "person deleted");
    Ok(())
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn get_history(&self, id: Uuid) -> Result<Vec<PersonHistoryEntry>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, version, change, name, metadata,
                  created_at, updated_at, recorded_at
           FROM person_history
           WHERE person_id = ?1
           ORDER BY version",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(roster_core::Error::HistoryNotFound(id).into());
    }

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }

  // ── Associations ──────────────────────────────────────────────────────────

  async fn list_faces_for_person(&self, id: Uuid) -> Result<Vec<Face>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawFace> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FACE_COLUMNS} FROM faces WHERE person_id = ?1 ORDER BY face_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawFace::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(person_id = %id, count = raws.len(), "listed faces");
    raws.into_iter().map(RawFace::into_face).collect()
  }

  async fn get_face<'a>(&'a self, face_id: &'a str) -> Result<Face> {
    let key = face_id.to_owned();

    let raw: Option<RawFace> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FACE_COLUMNS} FROM faces WHERE face_id = ?1"),
              rusqlite::params![key],
              RawFace::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or_else(|| roster_core::Error::FaceNotFound(face_id.to_owned()))?
      .into_face()
  }

  async fn list_faces(&self, offset: usize, limit: usize) -> Result<Vec<Face>> {
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawFace> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FACE_COLUMNS} FROM faces ORDER BY face_id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawFace::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(offset, limit, count = raws.len(), "listed faces");
    raws.into_iter().map(RawFace::into_face).collect()
  }

  async fn list_persons_for_match<'a>(
    &'a self,
    match_id: &'a str,
  ) -> Result<Vec<Person>> {
    // Inner join against `persons`: members whose person was deleted drop out.
    self
      .query_persons(
        "JOIN match_members m ON m.person_id = p.person_id
         WHERE m.match_id = ?1
         ORDER BY p.person_id",
        Some(match_id.to_owned()),
      )
      .await
  }

  // ── Health ────────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────
//
// These run on the database thread. Returning early (or with an error) drops
// the transaction, which rolls it back.

fn update_in_tx(
  conn:  &mut rusqlite::Connection,
  id:    Uuid,
  patch: PersonPatch,
  now:   DateTime<Utc>,
) -> Result<Option<(Person, u32)>> {
  let id_str = encode_uuid(id);
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let Some(raw) = select_person(&tx, &id_str)? else {
    return Ok(None);
  };
  let mut person = raw.into_person()?;
  person.apply(patch);
  person.updated_at = now.max(person.updated_at);

  let version = next_version(&tx, &id_str)?;
  let entry = PersonHistoryEntry::snapshot(&person, version, ChangeKind::Updated, now);

  let row = RawPerson::encode(&person)?;
  tx.execute(
    "UPDATE persons SET name = ?2, metadata = ?3, updated_at = ?4
     WHERE person_id = ?1",
    rusqlite::params![row.person_id, row.name, row.metadata, row.updated_at],
  )?;
  append_history(&tx, &RawHistoryEntry::encode(&entry)?)?;

  tx.commit()?;
  Ok(Some((person, version)))
}

fn delete_in_tx(
  conn: &mut rusqlite::Connection,
  id:   Uuid,
  now:  DateTime<Utc>,
) -> Result<Option<u32>> {
  let id_str = encode_uuid(id);
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let Some(raw) = select_person(&tx, &id_str)? else {
    return Ok(None);
  };
  let person = raw.into_person()?;

  let version = next_version(&tx, &id_str)?;
  let tombstone =
    PersonHistoryEntry::snapshot(&person, version, ChangeKind::Deleted, now);

  tx.execute(
    "DELETE FROM persons WHERE person_id = ?1",
    rusqlite::params![id_str],
  )?;
  append_history(&tx, &RawHistoryEntry::encode(&tombstone)?)?;

  tx.commit()?;
  Ok(Some(version))
}

// ─── Statement helpers ───────────────────────────────────────────────────────

fn select_person(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons p WHERE p.person_id = ?1"),
      rusqlite::params![id],
      RawPerson::from_row,
    )
    .optional()
}

fn insert_person(conn: &rusqlite::Connection, row: &RawPerson) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO persons (person_id, name, metadata, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      row.person_id,
      row.name,
      row.metadata,
      row.created_at,
      row.updated_at,
    ],
  )?;
  Ok(())
}

fn next_version(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<u32> {
  conn.query_row(
    "SELECT COALESCE(MAX(version), 0) + 1 FROM person_history WHERE person_id = ?1",
    rusqlite::params![id],
    |r| r.get(0),
  )
}

fn append_history(
  conn: &rusqlite::Connection,
  entry: &RawHistoryEntry,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO person_history (
       person_id, version, change, name, metadata,
       created_at, updated_at, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      entry.person_id,
      entry.version,
      entry.change,
      entry.name,
      entry.metadata,
      entry.created_at,
      entry.updated_at,
      entry.recorded_at,
    ],
  )?;
  Ok(())
}

//! Bulk ingestion of face-grouping output.
//!
//! The `faces` and `match_members` tables are read-only for the gateway; these
//! methods are the write path used by the import tooling. Each batch is
//! applied in a single transaction.

use roster_core::face::{Face, MatchMember};
use tracing::info;

use crate::{
  encode::{encode_uuid, RawFace},
  Result, SqliteStore,
};

impl SqliteStore {
  /// Upsert `faces`, keyed by `face_id`. Returns the number of rows written.
  pub async fn import_faces(&self, faces: Vec<Face>) -> Result<usize> {
    let rows = faces
      .iter()
      .map(RawFace::encode)
      .collect::<Result<Vec<_>>>()?;

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO faces (
               face_id, person_id, image_name, face_path, confidence, bounding_box
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (face_id) DO UPDATE SET
               person_id    = excluded.person_id,
               image_name   = excluded.image_name,
               face_path    = excluded.face_path,
               confidence   = excluded.confidence,
               bounding_box = excluded.bounding_box",
          )?;
          for row in &rows {
            written += stmt.execute(rusqlite::params![
              row.face_id,
              row.person_id,
              row.image_name,
              row.face_path,
              row.confidence,
              row.bounding_box,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    info!(written, "imported faces");
    Ok(written)
  }

  /// Insert match memberships, skipping pairs that already exist. Returns the
  /// number of new rows.
  pub async fn import_match_members(&self, members: Vec<MatchMember>) -> Result<usize> {
    let rows: Vec<(String, String)> = members
      .into_iter()
      .map(|m| (m.match_id, encode_uuid(m.person_id)))
      .collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO match_members (match_id, person_id)
             VALUES (?1, ?2)",
          )?;
          for (match_id, person_id) in &rows {
            written += stmt.execute(rusqlite::params![match_id, person_id])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    info!(written, "imported match members");
    Ok(written)
  }
}

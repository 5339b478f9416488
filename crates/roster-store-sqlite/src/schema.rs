//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per live person. Deleting a person removes its row here only.
CREATE TABLE IF NOT EXISTS persons (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    metadata    TEXT NOT NULL DEFAULT '{}',   -- JSON object
    created_at  TEXT NOT NULL,                -- ISO 8601 UTC
    updated_at  TEXT NOT NULL
);

-- Append-only. No row is ever updated or deleted; the triggers below abort
-- any attempt. Rows outlive the matching `persons` row, so there is no
-- foreign key.
CREATE TABLE IF NOT EXISTS person_history (
    person_id   TEXT    NOT NULL,
    version     INTEGER NOT NULL CHECK (version >= 1),
    change      TEXT    NOT NULL,  -- 'created' | 'updated' | 'deleted'
    name        TEXT    NOT NULL,
    metadata    TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL,
    recorded_at TEXT    NOT NULL,
    PRIMARY KEY (person_id, version)
);

CREATE TRIGGER IF NOT EXISTS person_history_no_update
BEFORE UPDATE ON person_history
BEGIN
    SELECT RAISE(ABORT, 'person_history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS person_history_no_delete
BEFORE DELETE ON person_history
BEGIN
    SELECT RAISE(ABORT, 'person_history is append-only');
END;

-- Written by the face grouping job; read-only for the gateway.
CREATE TABLE IF NOT EXISTS faces (
    face_id      TEXT PRIMARY KEY,
    person_id    TEXT,             -- NULL while unassigned
    image_name   TEXT NOT NULL,
    face_path    TEXT,
    confidence   REAL,
    bounding_box TEXT              -- JSON-encoded BoundingBox or NULL
);

CREATE TABLE IF NOT EXISTS match_members (
    match_id   TEXT NOT NULL,
    person_id  TEXT NOT NULL,
    PRIMARY KEY (match_id, person_id)
);

CREATE INDEX IF NOT EXISTS faces_person_idx         ON faces(person_id);
CREATE INDEX IF NOT EXISTS match_members_person_idx ON match_members(person_id);

PRAGMA user_version = 1;
";

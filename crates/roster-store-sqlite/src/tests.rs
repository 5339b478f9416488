//! Integration tests for `SqliteStore` against an in-memory database.

use roster_core::{
  face::{BoundingBox, Face, MatchMember},
  history::ChangeKind,
  person::{Metadata, NewPerson, PersonPatch},
  store::{PersonStore, StoreError},
};
use serde_json::json;
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn metadata(value: serde_json::Value) -> Metadata {
  value.as_object().cloned().expect("json object")
}

fn face(face_id: &str, person_id: Option<Uuid>) -> Face {
  Face {
    face_id: face_id.into(),
    person_id,
    image_name: format!("{face_id}.jpg"),
    face_path: None,
    confidence: Some(0.98),
    bounding_box: None,
  }
}

fn is_person_not_found(err: &Error) -> bool {
  matches!(err.as_core(), Some(roster_core::Error::PersonNotFound(_)))
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_person() {
  let s = store().await;

  let input = NewPerson::new("Alice").with_metadata(metadata(json!({ "team": "red" })));
  let created = s.create_person(input).await.unwrap();
  assert_eq!(created.name, "Alice");
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_person(created.id).await.unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.metadata["team"], "red");

  let history = s.get_history(created.id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].version, 1);
  assert_eq!(history[0].change, ChangeKind::Created);
  assert_eq!(history[0].name, "Alice");
  assert_eq!(history[0].metadata, created.metadata);
  assert_eq!(history[0].created_at, created.created_at);
}

#[tokio::test]
async fn create_assigns_distinct_ids() {
  let s = store().await;
  let a = s.create_person(NewPerson::new("Alice")).await.unwrap();
  let b = s.create_person(NewPerson::new("Alice")).await.unwrap();
  assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn create_rejects_invalid_input_without_writing() {
  let s = store().await;

  let err = s.create_person(NewPerson::new("  ")).await.unwrap_err();
  assert!(matches!(err.as_core(), Some(roster_core::Error::Validation(_))));

  assert!(s.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_person_missing_is_not_found() {
  let s = store().await;
  let err = s.get_person(Uuid::new_v4()).await.unwrap_err();
  assert!(is_person_not_found(&err));
}

#[tokio::test]
async fn list_persons_ordered_by_id() {
  let s = store().await;
  let mut ids = Vec::new();
  for name in ["Carol", "Alice", "Bob"] {
    ids.push(s.create_person(NewPerson::new(name)).await.unwrap().id);
  }
  ids.sort();

  let listed: Vec<Uuid> = s
    .list_persons()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  assert_eq!(listed, ids);
}

#[tokio::test]
async fn search_persons_is_case_insensitive_substring() {
  let s = store().await;
  s.create_person(NewPerson::new("Alice Liddell")).await.unwrap();
  s.create_person(NewPerson::new("Bob Alison")).await.unwrap();
  s.create_person(NewPerson::new("Carol")).await.unwrap();

  let hits = s.search_persons("ALI").await.unwrap();
  assert_eq!(hits.len(), 2);
  assert!(hits.iter().all(|p| p.name.to_lowercase().contains("ali")));

  // Wildcards in the fragment are matched literally.
  assert!(s.search_persons("%").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_persons_folds_non_ascii_case() {
  let s = store().await;
  let elise = s.create_person(NewPerson::new("Élise Ørsted")).await.unwrap();
  s.create_person(NewPerson::new("Elise")).await.unwrap();

  for fragment in ["élise", "ÉLISE", "ørsted", "ØRSTED"] {
    let hits = s.search_persons(fragment).await.unwrap();
    assert_eq!(hits, vec![elise.clone()], "{fragment}");
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_changes_only_supplied_fields() {
  let s = store().await;
  let created = s
    .create_person(
      NewPerson::new("Alice").with_metadata(metadata(json!({ "team": "red" }))),
    )
    .await
    .unwrap();

  let updated = s
    .update_person(created.id, PersonPatch::name("Alice B."))
    .await
    .unwrap();
  assert_eq!(updated.name, "Alice B.");
  assert_eq!(updated.metadata["team"], "red");
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);

  assert_eq!(s.get_person(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn n_updates_yield_n_plus_one_versions() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("v1")).await.unwrap();

  let n = 5;
  let mut last_updated_at = person.updated_at;
  for i in 2..=n + 1 {
    let p = s
      .update_person(person.id, PersonPatch::name(format!("v{i}")))
      .await
      .unwrap();
    assert!(p.updated_at >= last_updated_at);
    last_updated_at = p.updated_at;
  }

  let history = s.get_history(person.id).await.unwrap();
  assert_eq!(history.len(), n as usize + 1);
  for (i, entry) in history.iter().enumerate() {
    assert_eq!(entry.version, i as u32 + 1);
    assert_eq!(entry.name, format!("v{}", i + 1));
  }
  assert_eq!(history[0].change, ChangeKind::Created);
  assert!(history[1..].iter().all(|e| e.change == ChangeKind::Updated));
}

#[tokio::test]
async fn empty_patch_still_records_a_version() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();

  let same = s
    .update_person(person.id, PersonPatch::default())
    .await
    .unwrap();
  assert_eq!(same.name, "Alice");
  assert_eq!(s.get_history(person.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_patch_leaves_person_untouched() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();

  let err = s
    .update_person(person.id, PersonPatch::name(""))
    .await
    .unwrap_err();
  assert!(matches!(err.as_core(), Some(roster_core::Error::Validation(_))));

  assert_eq!(s.get_person(person.id).await.unwrap(), person);
  assert_eq!(s.get_history(person.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let s = store().await;
  let err = s
    .update_person(Uuid::new_v4(), PersonPatch::name("Nobody"))
    .await
    .unwrap_err();
  assert!(is_person_not_found(&err));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_keeps_history_and_appends_tombstone() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();
  s.update_person(person.id, PersonPatch::name("Alice B."))
    .await
    .unwrap();

  s.delete_person(person.id).await.unwrap();

  let err = s.get_person(person.id).await.unwrap_err();
  assert!(is_person_not_found(&err));

  let history = s.get_history(person.id).await.unwrap();
  let summary: Vec<(u32, &str, bool)> = history
    .iter()
    .map(|e| (e.version, e.name.as_str(), e.is_tombstone()))
    .collect();
  assert_eq!(summary, vec![
    (1, "Alice", false),
    (2, "Alice B.", false),
    (3, "Alice B.", true),
  ]);
}

#[tokio::test]
async fn deleted_person_cannot_be_updated_or_deleted_again() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();
  s.delete_person(person.id).await.unwrap();

  let err = s
    .update_person(person.id, PersonPatch::name("Back"))
    .await
    .unwrap_err();
  assert!(is_person_not_found(&err));

  let err = s.delete_person(person.id).await.unwrap_err();
  assert!(is_person_not_found(&err));

  // No extra versions were written by the failed calls.
  assert_eq!(s.get_history(person.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_missing_is_not_found() {
  let s = store().await;
  let err = s.delete_person(Uuid::new_v4()).await.unwrap_err();
  assert!(is_person_not_found(&err));
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_of_unknown_id_is_not_found() {
  let s = store().await;
  let err = s.get_history(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err.as_core(),
    Some(roster_core::Error::HistoryNotFound(_))
  ));
}

#[tokio::test]
async fn history_rows_are_append_only() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();
  let id = person.id.hyphenated().to_string();

  let id_for_update = id.clone();
  let update = s
    .conn
    .call(move |conn| {
      conn.execute(
        "UPDATE person_history SET name = 'Mallory' WHERE person_id = ?1",
        rusqlite::params![id_for_update],
      )?;
      Ok(())
    })
    .await;
  assert!(update.is_err());

  let delete = s
    .conn
    .call(move |conn| {
      conn.execute(
        "DELETE FROM person_history WHERE person_id = ?1",
        rusqlite::params![id],
      )?;
      Ok(())
    })
    .await;
  assert!(delete.is_err());

  let history = s.get_history(person.id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].name, "Alice");
}

#[tokio::test]
async fn failed_history_append_rolls_back_person_write() {
  let s = store().await;
  let alice = s.create_person(NewPerson::new("Alice")).await.unwrap();

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER person_history_unavailable
         BEFORE INSERT ON person_history
         BEGIN
           SELECT RAISE(ABORT, 'history unavailable');
         END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(s.create_person(NewPerson::new("Bob")).await.is_err());
  assert!(s.update_person(alice.id, PersonPatch::name("Alicia")).await.is_err());
  assert!(s.delete_person(alice.id).await.is_err());

  // No current-row write survived without its history entry.
  assert_eq!(s.list_persons().await.unwrap(), vec![alice.clone()]);
  assert_eq!(s.get_person(alice.id).await.unwrap(), alice);
  assert_eq!(s.get_history(alice.id).await.unwrap().len(), 1);
}

// ─── Faces ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn faces_for_person_without_faces_is_empty() {
  let s = store().await;
  let person = s.create_person(NewPerson::new("Alice")).await.unwrap();

  assert!(s.list_faces_for_person(person.id).await.unwrap().is_empty());
  assert!(s.list_faces_for_person(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn faces_for_person_returns_only_assigned_faces() {
  let s = store().await;
  let alice = s.create_person(NewPerson::new("Alice")).await.unwrap();
  let bob = s.create_person(NewPerson::new("Bob")).await.unwrap();

  let mut boxed = face("f1", Some(alice.id));
  boxed.bounding_box = Some(BoundingBox { x: 10, y: 20, width: 64, height: 64 });
  boxed.face_path = Some("faces/f1.png".into());

  let written = s
    .import_faces(vec![
      boxed.clone(),
      face("f2", Some(alice.id)),
      face("f3", Some(bob.id)),
      face("f4", None),
    ])
    .await
    .unwrap();
  assert_eq!(written, 4);

  let faces = s.list_faces_for_person(alice.id).await.unwrap();
  let ids: Vec<&str> = faces.iter().map(|f| f.face_id.as_str()).collect();
  assert_eq!(ids, ["f1", "f2"]);
  assert_eq!(faces[0], boxed);
}

#[tokio::test]
async fn reimporting_a_face_reassigns_it() {
  let s = store().await;
  let alice = s.create_person(NewPerson::new("Alice")).await.unwrap();
  let bob = s.create_person(NewPerson::new("Bob")).await.unwrap();

  s.import_faces(vec![face("f1", Some(alice.id))]).await.unwrap();
  s.import_faces(vec![face("f1", Some(bob.id))]).await.unwrap();

  assert!(s.list_faces_for_person(alice.id).await.unwrap().is_empty());
  assert_eq!(s.list_faces_for_person(bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_face_by_id() {
  let s = store().await;
  let mut boxed = face("f1", None);
  boxed.bounding_box = Some(BoundingBox { x: 4, y: 8, width: 32, height: 40 });
  s.import_faces(vec![boxed.clone(), face("f2", None)]).await.unwrap();

  let fetched = s.get_face("f1").await.unwrap();
  assert_eq!(fetched.face_id, "f1");
  assert_eq!(fetched.person_id, None);
  assert_eq!(fetched.bounding_box, boxed.bounding_box);

  let err = s.get_face("missing").await.unwrap_err();
  assert!(matches!(
    err.as_core(),
    Some(roster_core::Error::FaceNotFound(id)) if id == "missing"
  ));
}

#[tokio::test]
async fn list_faces_pages_in_face_id_order() {
  let s = store().await;
  s.import_faces(vec![face("f3", None), face("f1", None), face("f2", None)])
    .await
    .unwrap();

  let ids = |faces: Vec<Face>| -> Vec<String> {
    faces.into_iter().map(|f| f.face_id).collect()
  };

  assert_eq!(ids(s.list_faces(0, 10).await.unwrap()), ["f1", "f2", "f3"]);
  assert_eq!(ids(s.list_faces(1, 1).await.unwrap()), ["f2"]);
  assert!(s.list_faces(3, 10).await.unwrap().is_empty());
  assert_eq!(ids(s.list_faces(2, usize::MAX).await.unwrap()), ["f3"]);
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn match_excludes_deleted_members() {
  let s = store().await;
  let a1 = s.create_person(NewPerson::new("A1")).await.unwrap();
  let a2 = s.create_person(NewPerson::new("A2")).await.unwrap();

  s.import_match_members(vec![
    MatchMember { match_id: "M7".into(), person_id: a1.id },
    MatchMember { match_id: "M7".into(), person_id: a2.id },
  ])
  .await
  .unwrap();
  s.delete_person(a2.id).await.unwrap();

  let members = s.list_persons_for_match("M7").await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].id, a1.id);
}

#[tokio::test]
async fn unknown_match_is_empty() {
  let s = store().await;
  assert!(s.list_persons_for_match("nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_match_members_are_ignored() {
  let s = store().await;
  let a1 = s.create_person(NewPerson::new("A1")).await.unwrap();
  let member = MatchMember { match_id: "M1".into(), person_id: a1.id };

  let first = s.import_match_members(vec![member.clone()]).await.unwrap();
  let second = s
    .import_match_members(vec![member.clone(), member])
    .await
    .unwrap();
  assert_eq!((first, second), (1, 0));
  assert_eq!(s.list_persons_for_match("M1").await.unwrap().len(), 1);
}

// ─── Scenario ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alice_lifecycle() {
  let s = store().await;

  let alice = s.create_person(NewPerson::new("Alice")).await.unwrap();
  s.update_person(alice.id, PersonPatch::name("Alice B."))
    .await
    .unwrap();
  assert_eq!(s.get_person(alice.id).await.unwrap().name, "Alice B.");

  s.delete_person(alice.id).await.unwrap();
  assert!(is_person_not_found(&s.get_person(alice.id).await.unwrap_err()));

  let history = s.get_history(alice.id).await.unwrap();
  let changes: Vec<(u32, ChangeKind)> =
    history.iter().map(|e| (e.version, e.change)).collect();
  assert_eq!(changes, vec![
    (1, ChangeKind::Created),
    (2, ChangeKind::Updated),
    (3, ChangeKind::Deleted),
  ]);
  assert_eq!(history[0].name, "Alice");
  assert_eq!(history[1].name, "Alice B.");
}

#[tokio::test]
async fn ping_succeeds_on_open_store() {
  let s = store().await;
  s.ping().await.unwrap();
}

use super::*;

use crate::services::session::Role;
use crate::state::test_helpers::dummy_user;

fn file_store(dir: &tempfile::TempDir) -> FileStore {
    FileStore::new(dir.path().join("session.json"))
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_round_trips_a_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let user = dummy_user("u-1", Role::Admin);

    store.save(&user).unwrap();
    assert_eq!(store.load().unwrap(), Some(user));
}

#[test]
fn file_store_missing_file_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_malformed_json_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{not json").unwrap();

    let store = FileStore::new(path);
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_unknown_role_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let raw = r#"{
        "saved_at": "2026-01-01T00:00:00Z",
        "user": { "id": "u", "name": "u", "role": "owner", "profileImage": "x" }
    }"#;
    fs::write(&path, raw).unwrap();

    let store = FileStore::new(path);
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_accepts_a_record_without_additional_info() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let raw = r#"{
        "saved_at": "2026-01-01T00:00:00Z",
        "user": { "id": "u-7", "name": "u-7", "role": "user", "profileImage": "x" }
    }"#;
    fs::write(&path, raw).unwrap();

    let store = FileStore::new(path);
    let user = store.load().unwrap().unwrap();
    assert_eq!(user.id, "u-7");
    assert!(user.additional_info.is_empty());
}

#[test]
fn file_store_save_overwrites_the_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    store.save(&dummy_user("first", Role::User)).unwrap();
    store.save(&dummy_user("second", Role::Admin)).unwrap();
    assert_eq!(store.load().unwrap().unwrap().id, "second");
}

#[test]
fn file_store_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStore::new(path.clone());

    store.save(&dummy_user("u-1", Role::User)).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn file_store_envelope_carries_timestamp_and_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStore::new(path.clone());

    store.save(&dummy_user("u-1", Role::User)).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"saved_at\""));
    assert!(raw.contains("\"profileImage\""));
}

#[test]
fn file_store_clear_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStore::new(path.clone());

    store.save(&dummy_user("u-1", Role::User)).unwrap();
    store.clear().unwrap();
    assert!(!path.exists());
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_clear_on_an_empty_store_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.clear().unwrap();
    store.clear().unwrap();
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_round_trips_a_user() {
    let store = MemoryStore::new();
    let user = dummy_user("u-1", Role::User);
    store.save(&user).unwrap();
    assert_eq!(store.load().unwrap(), Some(user));
}

#[test]
fn memory_store_clear_empties_the_slot() {
    let store = MemoryStore::with_user(dummy_user("u-1", Role::User));
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

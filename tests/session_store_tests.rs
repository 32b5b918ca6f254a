//! Integration tests for SessionStore

use farming::session::{Session, SessionStatus, SessionStore, Sessions};
use farming::FarmingError;
use tempfile::tempdir;

fn sample_sessions() -> Sessions {
    let mut open = Session::new("900");
    open.participants.insert("u1".to_string(), "Alice".to_string());
    open.participants.insert("u2".to_string(), "Bob".to_string());

    let mut closed = Session::new("901");
    closed.status = SessionStatus::Closed;

    let mut sessions = Sessions::new();
    sessions.insert("1234567890".to_string(), open);
    sessions.insert("9876543210".to_string(), closed);
    sessions
}

#[test]
fn test_load_missing_file_is_empty() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = SessionStore::new(dir.path().join("farmings.json"));

    assert!(store.load()?.is_empty());

    Ok(())
}

#[test]
fn test_save_then_load_reproduces_sessions() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = SessionStore::new(dir.path().join("farmings.json"));
    let sessions = sample_sessions();

    store.save(&sessions)?;
    let loaded = store.load()?;

    assert_eq!(loaded, sessions);
    let nicknames: Vec<_> = loaded["1234567890"].participants.values().collect();
    assert_eq!(nicknames, vec!["Alice", "Bob"]);

    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("state").join("farmings.json");
    let store = SessionStore::new(&path);

    store.save(&sample_sessions())?;

    assert!(path.exists());
    Ok(())
}

#[test]
fn test_file_layout_matches_documented_format() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = SessionStore::new(dir.path().join("farmings.json"));
    store.save(&sample_sessions())?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(store.path())?)?;
    let record = &raw["1234567890"];
    assert_eq!(record["creator_id"], "900");
    assert_eq!(record["status"], "open");
    assert_eq!(record["participants"]["u1"], "Alice");
    assert_eq!(raw["9876543210"]["status"], "closed");

    Ok(())
}

#[test]
fn test_load_accepts_integer_ids() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("farmings.json");
    std::fs::write(
        &path,
        r#"{
  "4455667788": {
    "creator_id": 311112222333344445,
    "status": "closed",
    "participants": {"311112222333344446": "Carl"}
  }
}"#,
    )?;

    let sessions = SessionStore::new(&path).load()?;
    let session = &sessions["4455667788"];
    assert_eq!(session.creator_id, "311112222333344445");
    assert_eq!(session.status, SessionStatus::Closed);
    assert_eq!(session.participants["311112222333344446"], "Carl");

    Ok(())
}

#[test]
fn test_unparseable_file_is_corrupt() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("farmings.json");
    std::fs::write(&path, "{ not json")?;

    let result = SessionStore::new(&path).load();
    assert!(matches!(result, Err(FarmingError::StorageCorrupt { .. })));

    // The file must be left alone
    assert_eq!(std::fs::read_to_string(&path)?, "{ not json");
    Ok(())
}

#[test]
fn test_wrong_structure_is_corrupt() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("farmings.json");
    std::fs::write(&path, r#"{"1234567890": {"status": "pending"}}"#)?;

    let result = SessionStore::new(&path).load();
    assert!(matches!(result, Err(FarmingError::StorageCorrupt { .. })));
    Ok(())
}

#[test]
fn test_invalid_code_key_is_corrupt() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("farmings.json");
    std::fs::write(
        &path,
        r#"{"12345": {"creator_id": "1", "status": "open", "participants": {}}}"#,
    )?;

    match SessionStore::new(&path).load() {
        Err(FarmingError::StorageCorrupt { reason, .. }) => assert!(reason.contains("12345")),
        other => panic!("Expected StorageCorrupt, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_failed_save_keeps_previous_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    // A directory in place of the data file makes the final rename fail
    let path = dir.path().join("farmings.json");
    std::fs::create_dir(&path)?;
    std::fs::write(path.join("keep"), "x")?;

    let result = SessionStore::new(&path).save(&sample_sessions());

    assert!(matches!(result, Err(FarmingError::StorageWrite { .. })));
    assert!(path.join("keep").exists());
    assert!(!dir.path().join("farmings.json.tmp").exists());
    Ok(())
}

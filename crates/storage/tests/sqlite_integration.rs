use showcase_core::model::{AccessToken, RefreshToken, Session, UserId};
use showcase_core::time::fixed_now;
use storage::repository::{KeyValueStore, SESSION_STORAGE_KEY, StorageError};
use storage::repository::Storage;
use storage::sqlite::SqliteStore;

fn session(access: &str) -> Session {
    Session::new(
        UserId::new(1),
        "Linus",
        AccessToken::new(access).unwrap(),
        RefreshToken::new("refresh-token").unwrap(),
    )
    .with_expiry_hint(Some(fixed_now()))
}

#[tokio::test]
async fn sqlite_store_overwrites_and_removes_keys() {
    let repo = SqliteStore::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are re-runnable.
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get_item("theme").await.unwrap(), None);
    repo.set_item("theme", "dark").await.unwrap();
    repo.set_item("theme", "light").await.unwrap();
    assert_eq!(repo.get_item("theme").await.unwrap().as_deref(), Some("light"));

    repo.remove_item("theme").await.unwrap();
    repo.remove_item("theme").await.unwrap();
    assert_eq!(repo.get_item("theme").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_storage_persists_session_under_one_key() {
    let storage = Storage::sqlite("sqlite:file:memdb_session?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    storage.sessions.save_session(&session("a-1")).await.unwrap();
    storage.sessions.save_session(&session("a-2")).await.unwrap();

    let loaded = storage.sessions.load_session().await.unwrap().unwrap();
    assert_eq!(loaded.access_token().as_str(), "a-2");
    assert_eq!(loaded.refresh_token().as_str(), "refresh-token");
    assert_eq!(loaded.access_expiry_hint(), Some(fixed_now()));

    storage.sessions.clear_session().await.unwrap();
    assert!(storage.sessions.load_session().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_storage_flags_corrupt_session() {
    let storage = Storage::sqlite("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    storage
        .items
        .set_item(SESSION_STORAGE_KEY, "[1, 2, 3]")
        .await
        .unwrap();

    let err = storage.sessions.load_session().await.unwrap_err();
    assert!(matches!(err, StorageError::MalformedRecord(_)));
}

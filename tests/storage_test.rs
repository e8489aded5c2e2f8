//! Store-level tests against a tempfile-backed SQLite database.

use std::collections::HashSet;
use taskd::storage::{NewTask, StoreError, Storage, TaskPatch};
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> Storage {
    Storage::open(&dir.path().join("taskd.db"), 0).await.unwrap()
}

fn titled(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_assigns_unique_ids_and_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut seen = HashSet::new();
    for i in 0..5 {
        let task = store.create_task(titled(&format!("task {i}"))).await.unwrap();
        assert!(seen.insert(task.id.clone()), "id reused: {}", task.id);
        assert!(!task.completed);
        assert_eq!(task.time, "");
        assert_eq!(task.date, "");
        assert_eq!(task.category, "");
        assert!(!task.created_at.is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }
}

#[tokio::test]
async fn create_rejects_empty_title_and_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    for bad in ["", "   ", "\t\n"] {
        let err = store.create_task(titled(bad)).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyTitle));
    }
    assert!(store.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    for title in ["first", "second", "third"] {
        store.create_task(titled(title)).await.unwrap();
    }

    let tasks = store.list_tasks().await.unwrap();
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn update_merges_partially() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let task = store
        .create_task(NewTask {
            title: "dentist".to_string(),
            time: "09:30".to_string(),
            date: "2026-09-01".to_string(),
            category: "Health".to_string(),
            completed: false,
        })
        .await
        .unwrap();

    let updated = store
        .update_task(
            &task.id,
            TaskPatch {
                time: Some("14:00".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Only the patched field moves; everything else keeps its prior value.
    assert_eq!(updated.time, "14:00");
    assert_eq!(updated.title, "dentist");
    assert_eq!(updated.date, "2026-09-01");
    assert_eq!(updated.category, "Health");
    assert!(!updated.completed);
    assert_eq!(updated.created_at, task.created_at);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let err = store
        .update_task("no-such-id", TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn update_cannot_blank_the_title() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let task = store.create_task(titled("keep me")).await.unwrap();

    let err = store
        .update_task(
            &task.id,
            TaskPatch {
                title: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyTitle));

    let unchanged = store.get_task(&task.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "keep me");
}

#[tokio::test]
async fn toggling_completed_twice_restores_original_state() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let task = store.create_task(titled("flip me")).await.unwrap();

    let flipped = store
        .update_task(
            &task.id,
            TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(flipped.completed);

    let restored = store
        .update_task(
            &task.id,
            TaskPatch {
                completed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!restored.completed);
    assert_eq!(restored.title, task.title);
}

#[tokio::test]
async fn delete_removes_and_absent_delete_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let task = store.create_task(titled("ephemeral")).await.unwrap();

    assert!(store.delete_task(&task.id).await.unwrap());
    assert!(store.list_tasks().await.unwrap().is_empty());

    // Second delete of the same id, and a delete of a never-seen id.
    assert!(!store.delete_task(&task.id).await.unwrap());
    assert!(!store.delete_task("never-existed").await.unwrap());
}

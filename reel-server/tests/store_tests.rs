//! Integration tests for the video entity store
//!
//! Each test runs against its own SQLite database: in-memory by default,
//! on disk with a multi-connection pool for the concurrency tests.

use reel_common::api::{ListQuery, SortOrder};
use reel_common::{NewVideo, Transformation, VideoPatch};
use reel_server::db::{StoreConnection, StoreError, VideoStore};
use std::sync::Arc;

const UNKNOWN_ID: &str = "507f1f77bcf86cd799439011";

/// Test helper: store over a fresh in-memory database
fn setup_store() -> VideoStore {
    VideoStore::new(Arc::new(StoreConnection::sqlite("sqlite::memory:", 1)))
}

/// Test helper: store over an on-disk database with a multi-connection pool
fn setup_file_store(dir: &tempfile::TempDir) -> VideoStore {
    let url = format!("sqlite://{}", dir.path().join("videos.db").display());
    VideoStore::new(Arc::new(StoreConnection::sqlite(url, 10)))
}

fn sample(title: &str) -> NewVideo {
    NewVideo::new(title, "", format!("https://cdn.example/{title}.mp4"), "https://cdn.example/t.jpg")
}

// =============================================================================
// Create / Find
// =============================================================================

#[tokio::test]
async fn test_create_then_find_returns_same_record() {
    let store = setup_store();

    let created = store.create(sample("A")).await.unwrap();
    assert_eq!(created.title, "A");
    assert_eq!(created.likes, 0);
    assert!(created.controls);
    assert_eq!(created.created_at, created.updated_at);

    let found = store.find_by_id(&created.id.to_string()).await.unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn test_create_persists_transformation_and_controls() {
    let store = setup_store();
    let transformation = Transformation {
        height: Some(1920),
        width: Some(1080),
        quality: Some(80),
    };

    let created = store
        .create(sample("B").with_controls(false).with_transformation(transformation))
        .await
        .unwrap();

    let found = store.find_by_id(&created.id.to_string()).await.unwrap();
    assert!(!found.controls);
    assert_eq!(found.transformation, Some(transformation));
}

#[tokio::test]
async fn test_create_rejects_missing_fields() {
    let store = setup_store();

    let err = store.create(NewVideo::default()).await.unwrap_err();
    match err {
        StoreError::Validation(e) => {
            assert_eq!(e.fields, vec!["title", "description", "videoUrl", "thumbnailUrl"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_ids_are_never_not_found() {
    let store = setup_store();

    for id in ["not-an-id", "", "507f1f77bcf86cd79943901", "507f1f77bcf86cd79943901z"] {
        assert!(matches!(store.find_by_id(id).await, Err(StoreError::InvalidId(_))), "{id}");
        assert!(matches!(store.delete(id).await, Err(StoreError::InvalidId(_))), "{id}");
        assert!(matches!(
            store.update(id, VideoPatch::default()).await,
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(store.like(id).await, Err(StoreError::InvalidId(_))));
    }
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let store = setup_store();

    assert!(matches!(store.find_by_id(UNKNOWN_ID).await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update(UNKNOWN_ID, VideoPatch::default().likes(1)).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.unlike(UNKNOWN_ID).await, Err(StoreError::NotFound(_))));
}

// =============================================================================
// Update / Delete
// =============================================================================

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let store = setup_store();
    let created = store.create(sample("A")).await.unwrap();
    let id = created.id.to_string();

    let updated = store.update(&id, VideoPatch::default().likes(5)).await.unwrap();
    assert_eq!(updated.likes, 5);
    assert_eq!(updated.title, "A");
    assert_eq!(updated.video_url, created.video_url);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_empty_update_still_advances_updated_at() {
    let store = setup_store();
    let created = store.create(sample("A")).await.unwrap();
    let id = created.id.to_string();

    let first = store.update(&id, VideoPatch::default()).await.unwrap();
    let second = store.update(&id, VideoPatch::default()).await.unwrap();

    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.title, created.title);
}

#[tokio::test]
async fn test_invalid_update_leaves_record_unchanged() {
    let store = setup_store();
    let created = store.create(sample("A")).await.unwrap();
    let id = created.id.to_string();

    let err = store
        .update(&id, VideoPatch::default().title("   ").likes(9))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(store.find_by_id(&id).await.unwrap(), created);
}

#[tokio::test]
async fn test_delete_then_find_is_not_found() {
    let store = setup_store();
    let created = store.create(sample("A")).await.unwrap();
    let id = created.id.to_string();

    store.delete(&id).await.unwrap();

    assert!(matches!(store.find_by_id(&id).await, Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_on_disk_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let store = setup_file_store(&dir);

    let mut ids = Vec::new();
    for i in 0..8 {
        ids.push(store.create(sample(&format!("v{i}"))).await.unwrap().id.to_string());
    }

    let tasks: Vec<_> = (0..64i64)
        .map(|n| {
            let store = store.clone();
            let id = ids[n as usize % ids.len()].clone();
            tokio::spawn(async move { store.update(&id, VideoPatch::default().likes(n)).await })
        })
        .collect();

    for task in tasks {
        let result = task.await.unwrap();
        assert!(result.is_ok(), "concurrent update failed: {:?}", result.err());
    }

    for (i, id) in ids.iter().enumerate() {
        let video = store.find_by_id(id).await.unwrap();
        assert_eq!(video.likes as usize % ids.len(), i);
        assert_eq!(video.title, format!("v{i}"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_on_disk_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = setup_file_store(&dir);
    let id = store.create(sample("A")).await.unwrap().id.to_string();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move { store.like(&id).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.find_by_id(&id).await.unwrap().likes, 32);
}

// =============================================================================
// Likes
// =============================================================================

#[tokio::test]
async fn test_like_and_unlike_never_go_negative() {
    let store = setup_store();
    let created = store.create(sample("A")).await.unwrap();
    let id = created.id.to_string();

    assert_eq!(store.like(&id).await.unwrap().likes, 1);
    assert_eq!(store.like(&id).await.unwrap().likes, 2);
    assert_eq!(store.unlike(&id).await.unwrap().likes, 1);
    assert_eq!(store.unlike(&id).await.unwrap().likes, 0);

    let floored = store.unlike(&id).await.unwrap();
    assert_eq!(floored.likes, 0);
    assert!(floored.updated_at > created.updated_at);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_orders_newest_first_by_default() {
    let store = setup_store();
    for title in ["first", "second", "third"] {
        store.create(sample(title)).await.unwrap();
    }

    let titles: Vec<String> = store
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    let ascending = store
        .list(&ListQuery {
            order: Some(SortOrder::Asc),
            ..ListQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(ascending[0].title, "first");
}

#[tokio::test]
async fn test_list_pages_with_limit_and_offset() {
    let store = setup_store();
    for title in ["a", "b", "c", "d"] {
        store.create(sample(title)).await.unwrap();
    }

    let page = store
        .list(&ListQuery {
            order: Some(SortOrder::Asc),
            limit: Some(2),
            offset: Some(1),
        })
        .await
        .unwrap();
    let titles: Vec<&str> = page.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);

    // Zero is clamped up to one record
    let clamped = store
        .list(&ListQuery {
            limit: Some(0),
            ..ListQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(clamped.len(), 1);
}

#[tokio::test]
async fn test_unreachable_store_reports_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("missing/videos.db").display());
    let store = VideoStore::new(Arc::new(StoreConnection::sqlite(url, 1)));

    // Connection failure takes precedence over the id check
    assert!(matches!(store.find_by_id("not-an-id").await, Err(StoreError::Unavailable(_))));
    assert!(matches!(store.find_all().await, Err(StoreError::Unavailable(_))));
}

use chrono::{DateTime, Duration, TimeZone, Utc};
use progress_core::model::{LearningProgress, NewProgress, OwnerId, ProgressId};
use storage::repository::{ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed(repo: &SqliteRepository, who: &str, at: DateTime<Utc>) -> LearningProgress {
    let draft = NewProgress::new(owner(who), at, "Pattern matching", "match guards", "Rust")
        .unwrap();
    repo.insert(draft).await.expect("insert")
}

#[tokio::test]
async fn sqlite_find_and_delete_by_owner() {
    let repo = connect("memdb_find_delete").await;
    let u1_first = seed(&repo, "u1", jan(1)).await;
    let u1_last = seed(&repo, "u1", jan(5)).await;
    let u2 = seed(&repo, "u2", jan(3)).await;

    let found = repo
        .find_by_owner_and_date_range(&owner("u1"), jan(1), jan(5))
        .await
        .expect("find");
    assert_eq!(found, vec![u1_first, u1_last]);

    let inner = repo
        .find_by_owner_and_date_range(&owner("u1"), jan(2), jan(4))
        .await
        .expect("find inner");
    assert!(inner.is_empty());

    let removed = repo.delete_by_owner(&owner("u1")).await.expect("delete");
    assert_eq!(removed, 2);
    assert!(repo.list_by_owner(&owner("u1")).await.unwrap().is_empty());
    assert_eq!(repo.list_by_owner(&owner("u2")).await.unwrap(), vec![u2]);
}

#[tokio::test]
async fn sqlite_range_boundaries_with_time_of_day() {
    let repo = connect("memdb_boundaries").await;
    let start = jan(10) + Duration::hours(9);
    let end = start + Duration::minutes(30);

    let before = seed(&repo, "u1", start - Duration::milliseconds(1)).await;
    let at_start = seed(&repo, "u1", start).await;
    let at_end = seed(&repo, "u1", end).await;
    let after = seed(&repo, "u1", end + Duration::seconds(1)).await;

    let found = repo
        .find_by_owner_and_date_range(&owner("u1"), start, end)
        .await
        .unwrap();
    assert_eq!(found, vec![at_start, at_end]);
    assert!(!found.contains(&before));
    assert!(!found.contains(&after));
}

#[tokio::test]
async fn sqlite_unknown_owner_and_inverted_range_are_empty() {
    let repo = connect("memdb_empty_results").await;
    seed(&repo, "u1", jan(3)).await;

    let nobody = repo
        .find_by_owner_and_date_range(&owner("nobody"), jan(1), jan(31))
        .await
        .unwrap();
    assert!(nobody.is_empty());

    let inverted = repo
        .find_by_owner_and_date_range(&owner("u1"), jan(5), jan(1))
        .await
        .unwrap();
    assert!(inverted.is_empty());

    assert_eq!(repo.delete_by_owner(&owner("nobody")).await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_replace_and_get() {
    let repo = connect("memdb_replace").await;
    let stored = seed(&repo, "u1", jan(1)).await;

    let moved = stored
        .replaced_with(jan(20), "Closures", "Fn, FnMut, FnOnce", "Rust")
        .unwrap();
    repo.replace(&moved).await.expect("replace");

    assert_eq!(repo.get(stored.id()).await.unwrap(), moved);

    // The projected date column follows the replacement.
    let old_window = repo
        .find_by_owner_and_date_range(&owner("u1"), jan(1), jan(2))
        .await
        .unwrap();
    assert!(old_window.is_empty());
    let new_window = repo
        .find_by_owner_and_date_range(&owner("u1"), jan(19), jan(21))
        .await
        .unwrap();
    assert_eq!(new_window, vec![moved]);

    let ghost = stored.replaced_with(jan(2), "x", "", "y").unwrap();
    let ghost = LearningProgress::from_persisted(
        ProgressId::new("missing"),
        ghost.owner().clone(),
        ghost.date(),
        ghost.title().to_owned(),
        ghost.description().to_owned(),
        ghost.category().to_owned(),
    )
    .unwrap();
    assert!(matches!(
        repo.replace(&ghost).await.unwrap_err(),
        StorageError::NotFound
    ));
    assert!(matches!(
        repo.get(&ProgressId::new("missing")).await.unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn sqlite_rejects_document_with_blank_title() {
    let repo = connect("memdb_blank_title").await;
    let document = r#"{"id":"corrupt","postOwnerID":"u1","date":"2024-01-03T00:00:00Z","title":"  ","description":"","category":"Rust"}"#;

    sqlx::query(
        r"
            INSERT INTO learning_progress (id, post_owner_id, date, document)
            VALUES (?1, ?2, ?3, ?4)
        ",
    )
    .bind("corrupt")
    .bind("u1")
    .bind(jan(3))
    .bind(document)
    .execute(repo.pool())
    .await
    .expect("raw insert");

    assert!(matches!(
        repo.get(&ProgressId::new("corrupt")).await.unwrap_err(),
        StorageError::Serialization(_)
    ));
    assert!(matches!(
        repo.find_by_owner_and_date_range(&owner("u1"), jan(1), jan(5))
            .await
            .unwrap_err(),
        StorageError::Serialization(_)
    ));
}

use super::*;

#[tokio::test]
async fn new_database_starts_at_baseline() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get_count().await.expect("count"), CounterValue(0));
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn increments_and_decrements_by_one() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.increment().await.expect("inc"), CounterValue(1));
    assert_eq!(storage.increment().await.expect("inc"), CounterValue(2));
    assert_eq!(storage.decrement().await.expect("dec"), CounterValue(1));
    assert_eq!(storage.get_count().await.expect("count"), CounterValue(1));
}

#[tokio::test]
async fn decrement_goes_below_zero() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_count(CounterValue(-3)).await.expect("set");
    assert_eq!(storage.decrement().await.expect("dec"), CounterValue(-4));
    assert_eq!(storage.increment().await.expect("inc"), CounterValue(-3));
}

#[tokio::test]
async fn reset_returns_baseline_from_any_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for start in [-12, 0, 5, 9_000] {
        storage.set_count(CounterValue(start)).await.expect("set");
        assert_eq!(storage.reset().await.expect("reset"), CounterValue::BASELINE);
    }
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = format!(
        "sqlite://{}",
        dir.path()
            .join("app.db")
            .to_string_lossy()
            .replace('\\', "/")
    );
    let storage = Storage::new(&database_url).await.expect("db");

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let storage = storage.clone();
            tokio::spawn(async move { storage.increment().await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("increment");
    }

    assert_eq!(storage.get_count().await.expect("count"), CounterValue(20));
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("app.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn counter_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("app.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.set_count(CounterValue(41)).await.expect("set");
    storage.increment().await.expect("inc");
    storage.pool().close().await;

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(reopened.get_count().await.expect("count"), CounterValue(42));
}

#[test]
fn memory_url_has_no_file_path() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/app.db?mode=rwc"),
        Some(PathBuf::from("./data/app.db"))
    );
}
